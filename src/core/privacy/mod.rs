//! TCFv2 consent-string parsing: a small bit reader over the
//! IAB-defined fixed field layout, plus the parser built on top of it.

pub mod bitreader;
pub mod tcf;
