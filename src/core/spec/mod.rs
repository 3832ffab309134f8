pub mod nobidreasons;
