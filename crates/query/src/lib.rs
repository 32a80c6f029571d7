//! Client side of the external GraphQL query service.
//!
//! The traits in [`traits`] are the seam the rest of the workspace depends
//! on, [`GraphQlClient`] is the HTTP implementation and [`TrackedQuery`]
//! wraps executions with observable execution state.

pub mod client;
pub mod error;
pub mod tracked;
pub mod traits;
pub mod types;

pub use client::GraphQlClient;
pub use error::{QueryError, QueryResult};
pub use tracked::{QueryState, TrackedQuery};
