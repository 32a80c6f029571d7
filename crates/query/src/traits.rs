use async_trait::async_trait;
use chainview_primitives::prelude::*;
#[cfg(test)]
use mockall::automock;

use crate::{
    error::QueryResult,
    types::{EpochsInRange, TipSnapshot},
};

/// Range queries over epochs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EpochsQuery: Send + Sync + 'static {
    /// Fetches every epoch with `range.lower <= number <= range.upper`.
    async fn epochs_in_range(&self, range: EpochRange) -> QueryResult<EpochsInRange>;
}

/// Chain tip queries, used to feed the network info provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NetworkInfoQuery: Send + Sync + 'static {
    async fn network_tip(&self) -> QueryResult<TipSnapshot>;
}

/// Recent block queries, used to feed the blocks provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LatestBlocksQuery: Send + Sync + 'static {
    /// Fetches up to `limit` blocks, most recent first.
    async fn latest_blocks(&self, limit: u32) -> QueryResult<Vec<BlockRecord>>;
}
