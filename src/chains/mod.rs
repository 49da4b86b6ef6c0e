pub mod client;
pub mod evm;
pub mod registry;

pub use client::{ChainClient, ContractCall};
pub use evm::EvmClient;
pub use registry::RpcClientRegistry;
