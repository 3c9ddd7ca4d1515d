pub mod indexes;
pub mod scheduling;

pub use indexes::*;
pub use scheduling::*;
