//! Minimal ordered task-pipeline used to sequence startup/shutdown and
//! per-request processing stages against a shared context.
//!
//! Each stage is either a [`BlockingTask`] (cheap, synchronous, run inline)
//! or an [`AsyncTask`] (may await I/O). A stage that returns `Err` aborts the
//! remaining stages; the error is handed back to the caller of `run`.

use async_trait::async_trait;
use std::fmt;

/// A synchronous pipeline stage. Kept separate from [`AsyncTask`] so cheap
/// in-memory steps (validation, field extraction) don't pay for a poll.
pub trait BlockingTask<Ctx, E>: Send + Sync {
    fn run(&self, ctx: &Ctx) -> Result<(), E>;
}

/// An asynchronous pipeline stage, e.g. anything that performs I/O.
#[async_trait]
pub trait AsyncTask<Ctx, E>: Send + Sync {
    async fn run(&self, ctx: &Ctx) -> Result<(), E>;
}

enum Stage<Ctx, E> {
    Blocking(Box<dyn BlockingTask<Ctx, E>>),
    Async(Box<dyn AsyncTask<Ctx, E>>),
}

/// An ordered sequence of stages that share one context type and error type.
pub struct Pipeline<Ctx, E> {
    stages: Vec<Stage<Ctx, E>>,
}

impl<Ctx: Send + Sync, E> Pipeline<Ctx, E> {
    /// Runs every stage in order against `ctx`, stopping at the first error.
    pub async fn run(&self, ctx: &Ctx) -> Result<(), E> {
        for stage in &self.stages {
            match stage {
                Stage::Blocking(task) => task.run(ctx)?,
                Stage::Async(task) => task.run(ctx).await?,
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[derive(Debug)]
pub struct EmptyPipelineError;

impl fmt::Display for EmptyPipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline has no stages")
    }
}

impl std::error::Error for EmptyPipelineError {}

/// Builds a [`Pipeline`] by appending blocking/async stages in call order.
pub struct PipelineBuilder<Ctx, E> {
    stages: Vec<Stage<Ctx, E>>,
}

impl<Ctx, E> Default for PipelineBuilder<Ctx, E> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<Ctx: Send + Sync, E> PipelineBuilder<Ctx, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocking(mut self, task: Box<dyn BlockingTask<Ctx, E>>) -> Self {
        self.stages.push(Stage::Blocking(task));
        self
    }

    pub fn with_async(mut self, task: Box<dyn AsyncTask<Ctx, E>>) -> Self {
        self.stages.push(Stage::Async(task));
        self
    }

    pub fn add_blocking(&mut self, task: Box<dyn BlockingTask<Ctx, E>>) -> &mut Self {
        self.stages.push(Stage::Blocking(task));
        self
    }

    pub fn add_async(&mut self, task: Box<dyn AsyncTask<Ctx, E>>) -> &mut Self {
        self.stages.push(Stage::Async(task));
        self
    }

    /// Builds the pipeline, failing if no stages were ever added.
    pub fn build(self) -> Result<Pipeline<Ctx, E>, EmptyPipelineError> {
        if self.stages.is_empty() {
            return Err(EmptyPipelineError);
        }
        Ok(Pipeline {
            stages: self.stages,
        })
    }

    /// Builds the pipeline, or `None` if no stages were ever added. Used for
    /// pipelines that are optional depending on runtime configuration.
    pub fn build_optional(self) -> Option<Pipeline<Ctx, E>> {
        if self.stages.is_empty() {
            None
        } else {
            Some(Pipeline {
                stages: self.stages,
            })
        }
    }
}
