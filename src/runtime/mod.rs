//! Background behaviour layered on top of a shared broker.
//!
//! The broker never dispatches by itself. Running a periodic dispatch loop
//! is an explicit choice made by the application.

mod dispatch_loop;

pub use dispatch_loop::{LoopStats, run_dispatch_loop};
