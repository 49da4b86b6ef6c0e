pub mod chains;
pub mod settings;

pub use chains::{ChainRegistry, Contract};
pub use settings::{AppSettings, RefreshSettings, Settings, SubgraphSettings};
