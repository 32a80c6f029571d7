//! Error types for the query client.
use thiserror::Error;

/// This is an alias for the result type returned by the query traits.
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The service answered with a GraphQL `errors` array.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// The service answered with neither `data` nor `errors`.
    #[error("Empty data received")]
    EmptyData,

    #[error("Error parsing query response: {0}")]
    Parse(String),

    /// Body error, unlikely to be recoverable by retrying
    #[error("{0}")]
    Body(String),

    /// HTTP status error
    #[error("Obtained failure status({0}): {1}")]
    Status(String, String),

    /// Error decoding the response
    #[error("Malformed Response: {0}")]
    MalformedResponse(String),

    /// Connection error
    #[error("Could not connect: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("HttpRedirect: {0}")]
    HttpRedirect(String),

    /// Error building the request
    #[error("Could not build request: {0}")]
    ReqBuilder(String),

    #[error("Could not create request: {0}")]
    Request(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Timeout
        } else if err.is_connect() {
            QueryError::Connection(err.to_string())
        } else if err.is_status() {
            match err.status() {
                Some(code) => QueryError::Status(code.to_string(), err.to_string()),
                None => QueryError::Other(err.to_string()),
            }
        } else if err.is_decode() {
            QueryError::MalformedResponse(err.to_string())
        } else if err.is_body() {
            QueryError::Body(err.to_string())
        } else if err.is_builder() {
            QueryError::ReqBuilder(err.to_string())
        } else if err.is_redirect() {
            QueryError::HttpRedirect(err.to_string())
        } else if err.is_request() {
            QueryError::Request(err.to_string())
        } else {
            QueryError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Parse(err.to_string())
    }
}
