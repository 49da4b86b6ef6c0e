use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    config::{ChainRegistry, SubgraphSettings},
    models::{ChainId, EngineError, Result},
    subgraph::transport::{
        GraphqlRequest, GraphqlResponse, GraphqlTransport, HttpTransport, TransportResponse,
    },
};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Executes GraphQL queries against per-chain subgraph endpoints.
pub struct SubgraphClient {
    endpoints: HashMap<ChainId, String>,
    transport: Arc<dyn GraphqlTransport>,
    page_size: usize,
}

impl SubgraphClient {
    pub fn new(
        endpoints: HashMap<ChainId, String>,
        transport: Arc<dyn GraphqlTransport>,
        page_size: usize,
    ) -> Self {
        Self {
            endpoints,
            transport,
            page_size: page_size.max(1),
        }
    }

    pub fn from_settings(chains: &ChainRegistry, settings: &SubgraphSettings) -> Result<Self> {
        let transport = HttpTransport::new(std::time::Duration::from_secs(settings.timeout_secs))?;

        Ok(Self::new(
            chains.subgraph_endpoints(),
            Arc::new(transport),
            settings.page_size,
        ))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn endpoint(&self, chain: &ChainId) -> Result<&str> {
        self.endpoints
            .get(chain)
            .map(String::as_str)
            .ok_or_else(|| EngineError::SubgraphNotFound(chain.to_string()))
    }

    /// Run one query and flatten the top-level fields of `data` into a record list.
    pub async fn query(&self, chain: &ChainId, query: &str) -> Result<Vec<Value>> {
        let endpoint = self.endpoint(chain)?;
        let request = GraphqlRequest {
            query: query.to_string(),
        };

        let TransportResponse { status, body } = self
            .transport
            .post(endpoint, &request)
            .await
            .map_err(|e| subgraph_error(chain, e.to_string()))?;

        if status != 200 {
            return Err(subgraph_error(
                chain,
                format!("Status: {}. Error: {}", status, truncate(&body, 200)),
            ));
        }

        let response: GraphqlResponse = serde_json::from_str(&body)?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(subgraph_error(chain, messages.join("; ")));
        }

        let mut records = Vec::new();
        for (_, value) in response.data.unwrap_or_default() {
            match value {
                Value::Array(items) => records.extend(items),
                Value::Null => {}
                other => records.push(other),
            }
        }

        Ok(records)
    }

    /// Page through a query with `first`/`skip` offsets until a short page.
    ///
    /// There is no cursor: if the subgraph indexes new rows between two pages,
    /// rows can be duplicated or skipped. Callers order by a monotonic field
    /// (timestamp, descending) to keep the window stable.
    pub async fn query_paginated<T, F>(&self, chain: &ChainId, build_query: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        F: Fn(usize, usize) -> String + Send + Sync,
    {
        let take = self.page_size;
        let mut skip = 0;
        let mut result = Vec::new();

        loop {
            let page = self.query(chain, &build_query(take, skip)).await?;
            let got = page.len();

            for record in page {
                result.push(serde_json::from_value(record)?);
            }

            debug!("Fetched {} records from subgraph on {} (skip {})", got, chain, skip);

            if got < take {
                break;
            }
            skip += take;
        }

        Ok(result)
    }
}

fn subgraph_error(chain: &ChainId, message: String) -> EngineError {
    EngineError::Subgraph {
        chain: chain.to_string(),
        message,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subgraph::transport::MockGraphqlTransport;
    use serde_json::json;

    fn chain() -> ChainId {
        ChainId::from("146")
    }

    fn client(transport: MockGraphqlTransport, page_size: usize) -> SubgraphClient {
        let mut endpoints = HashMap::new();
        endpoints.insert(chain(), "https://subgraph.test/146".to_string());
        SubgraphClient::new(endpoints, Arc::new(transport), page_size)
    }

    fn ok(body: Value) -> Result<TransportResponse> {
        Ok(TransportResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    /// Serves `total` records, honouring the `"<take> <skip>"` query format.
    fn paged_transport(total: usize, expected_calls: usize) -> MockGraphqlTransport {
        let mut transport = MockGraphqlTransport::new();
        transport
            .expect_post()
            .times(expected_calls)
            .returning(move |_, request| {
                let mut parts = request.query.split(' ');
                let take: usize = parts.next().unwrap().parse().unwrap();
                let skip: usize = parts.next().unwrap().parse().unwrap();
                let items: Vec<Value> = (skip..total.min(skip + take))
                    .map(|i| json!({ "id": i }))
                    .collect();
                ok(json!({ "data": { "entities": items } }))
            });
        transport
    }

    #[derive(serde::Deserialize)]
    struct Record {
        id: usize,
    }

    #[tokio::test]
    async fn test_paginates_until_short_page() {
        let client = client(paged_transport(25, 3), 10);

        let records: Vec<Record> = client
            .query_paginated(&chain(), |take, skip| format!("{} {}", take, skip))
            .await
            .unwrap();

        assert_eq!(records.len(), 25);
        let ids: Vec<usize> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_exact_multiple_fetches_trailing_empty_page() {
        let client = client(paged_transport(20, 3), 10);

        let records: Vec<Record> = client
            .query_paginated(&chain(), |take, skip| format!("{} {}", take, skip))
            .await
            .unwrap();

        assert_eq!(records.len(), 20);
    }

    #[tokio::test]
    async fn test_empty_source_returns_nothing() {
        let client = client(paged_transport(0, 1), 10);

        let records: Vec<Record> = client
            .query_paginated(&chain(), |take, skip| format!("{} {}", take, skip))
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_flattens_top_level_fields() {
        let mut transport = MockGraphqlTransport::new();
        transport.expect_post().returning(|_, _| {
            ok(json!({
                "data": {
                    "a": [{ "id": 1 }, { "id": 2 }],
                    "b": { "id": 3 },
                    "c": null
                }
            }))
        });

        let records = client(transport, 10).query(&chain(), "{ a b c }").await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_chain_fails() {
        let transport = MockGraphqlTransport::new();
        let err = client(transport, 10)
            .query(&ChainId::from("1"), "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::SubgraphNotFound(_)));
    }

    #[tokio::test]
    async fn test_non_200_status_fails() {
        let mut transport = MockGraphqlTransport::new();
        transport.expect_post().returning(|_, _| {
            Ok(TransportResponse {
                status: 502,
                body: "bad gateway".to_string(),
            })
        });

        let err = client(transport, 10).query(&chain(), "{}").await.unwrap_err();
        assert!(matches!(err, EngineError::Subgraph { .. }));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_graphql_errors_fail() {
        let mut transport = MockGraphqlTransport::new();
        transport.expect_post().returning(|_, _| {
            ok(json!({ "data": null, "errors": [{ "message": "indexer not synced" }] }))
        });

        let err = client(transport, 10).query(&chain(), "{}").await.unwrap_err();
        assert!(err.to_string().contains("indexer not synced"));
    }

    #[tokio::test]
    async fn test_empty_errors_array_is_success() {
        let mut transport = MockGraphqlTransport::new();
        transport
            .expect_post()
            .returning(|_, _| ok(json!({ "data": { "a": [{ "id": 1 }] }, "errors": [] })));

        let records = client(transport, 10).query(&chain(), "{}").await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
