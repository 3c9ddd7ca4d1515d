pub mod collections;
pub mod indexes;
pub mod mongo;
pub mod node_role;

pub use indexes::*;
pub use mongo::*;
pub use node_role::ConfigNodeRole;
