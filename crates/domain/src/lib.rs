pub mod entities;
pub mod index;
pub mod ports;
pub mod repositories;

pub use entities::*;
pub use index::*;
pub use ports::*;
pub use repositories::*;
pub use crawl_core::{SchedulerError, SchedulerResult};
