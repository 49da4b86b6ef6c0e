pub mod chain;
pub mod dao;
pub mod error;
pub mod onchain;
pub mod revenue;

pub use chain::*;
pub use dao::*;
pub use error::*;
pub use onchain::*;
pub use revenue::*;
