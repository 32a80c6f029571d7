use std::{fmt, time::Duration};

use async_trait::async_trait;
use chainview_primitives::prelude::*;
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::*;

use crate::{
    error::{QueryError, QueryResult},
    traits::{EpochsQuery, LatestBlocksQuery, NetworkInfoQuery},
    types::*,
};

/// Body posted to the GraphQL endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a, V> {
    operation_name: &'a str,
    query: &'a str,
    variables: V,
}

/// Response returned by the GraphQL endpoint.
#[derive(Debug, Deserialize)]
struct Response<T> {
    data: Option<T>,
    errors: Option<Vec<ResponseError>>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    message: String,
}

impl<T> Response<T> {
    /// Any reported error wins over partial data.
    fn into_result(self) -> QueryResult<T> {
        if let Some(errors) = self.errors.filter(|errs| !errs.is_empty()) {
            return Err(QueryError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        self.data.ok_or(QueryError::EmptyData)
    }
}

/// An `async` client for the GraphQL query service.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    /// The URL of the GraphQL endpoint.
    url: String,
    /// The underlying `async` HTTP client.
    client: Client,
}

impl GraphQlClient {
    pub fn new(url: String, timeout: Duration) -> QueryResult<Self> {
        let content_type = "application/json"
            .parse()
            .map_err(|_| QueryError::Other("Error parsing header".to_string()))?;
        let headers = HeaderMap::from_iter([(CONTENT_TYPE, content_type)]);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Other(format!("Could not create client: {e}")))?;

        trace!(%url, "Created GraphQL client");

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn query<V, T>(&self, operation: &str, document: &str, variables: V) -> QueryResult<T>
    where
        V: Serialize + fmt::Debug,
        T: DeserializeOwned,
    {
        trace!(%operation, ?variables, "Running GraphQL query");

        let response = self
            .client
            .post(&self.url)
            .json(&Request {
                operation_name: operation,
                query: document,
                variables,
            })
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<Value>().await?;
        decode_response(body)
    }
}

#[async_trait]
impl EpochsQuery for GraphQlClient {
    async fn epochs_in_range(&self, range: EpochRange) -> QueryResult<EpochsInRange> {
        self.query(EPOCHS_IN_RANGE_OPERATION, EPOCHS_IN_RANGE_QUERY, range)
            .await
    }
}

#[async_trait]
impl NetworkInfoQuery for GraphQlClient {
    async fn network_tip(&self) -> QueryResult<TipSnapshot> {
        let data: NetworkInfoData = self
            .query(NETWORK_INFO_OPERATION, NETWORK_INFO_QUERY, json!({}))
            .await?;
        Ok(data.into())
    }
}

#[async_trait]
impl LatestBlocksQuery for GraphQlClient {
    async fn latest_blocks(&self, limit: u32) -> QueryResult<Vec<BlockRecord>> {
        let data: LatestBlocksData = self
            .query(
                LATEST_BLOCKS_OPERATION,
                LATEST_BLOCKS_QUERY,
                LatestBlocksVars { limit },
            )
            .await?;
        Ok(data.blocks)
    }
}

/// Decodes a response body. Bodies that are not JSON at all fail earlier as
/// [`QueryError::MalformedResponse`], bodies whose `data` has the wrong shape
/// fail here as [`QueryError::Parse`].
fn decode_response<T: DeserializeOwned>(body: Value) -> QueryResult<T> {
    serde_json::from_value::<Response<T>>(body)?.into_result()
}
