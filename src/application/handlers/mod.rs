//! Use-case handlers, one struct per operation.

pub mod registration;
pub mod reports;
pub mod review;
pub mod settings;
