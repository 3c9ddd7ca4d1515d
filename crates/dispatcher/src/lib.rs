//! Dispatcher
//!
//! Decides what tasks a run request produces and where they go:
//! target node resolution, task materialization with inherited spider
//! defaults, and the master-only scheduling coordinator.

pub mod coordinator;
pub mod materializer;
pub mod relations;
pub mod resolver;

pub use coordinator::*;
pub use materializer::*;
pub use relations::*;
pub use resolver::*;
