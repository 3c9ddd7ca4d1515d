//! # Crawl Testing Utils
//!
//! Shared testing utilities for the crawl scheduler workspace: in-memory
//! implementations of every repository and port trait, plus builders for
//! test entities.
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! crawl-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use mocks::*;
