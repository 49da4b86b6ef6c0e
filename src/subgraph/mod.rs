pub mod client;
pub mod transport;

pub use client::{SubgraphClient, DEFAULT_PAGE_SIZE};
pub use transport::{GraphqlRequest, GraphqlTransport, HttpTransport, TransportResponse};
