//! Domain layer - pure business types, free of I/O.

pub mod foundation;
pub mod registry;
pub mod session;
pub mod subscriber;
