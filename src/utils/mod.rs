//! The `utils` module provides the error types and logging setup shared
//! across `batchsub`.

pub mod error;
pub mod logging;
