pub mod adapter;
pub mod factory;
pub mod stbl;

pub use adapter::{system_clock, AdapterContext, Clock, DaoAdapter};
pub use factory::{AdapterConstructor, DaoFactory};
pub use stbl::{compute_apr, StblAdapter};
