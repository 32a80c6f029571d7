//! Polling workers that keep the [`StatusChannel`] fresh.

use std::{sync::Arc, time::Duration};

use chainview_primitives::prelude::*;
use chainview_query::{
    traits::{LatestBlocksQuery, NetworkInfoQuery},
    types::TipSnapshot,
    QueryResult,
};
use tracing::*;

use crate::StatusChannel;

/// Polls the chain tip forever, publishing it as [`NetworkInfo`].
pub async fn network_info_worker<Q: NetworkInfoQuery>(
    client: Arc<Q>,
    status: StatusChannel,
    poll_interval: Duration,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(err) = refresh_network_info(client.as_ref(), &status).await {
            // keep the previous snapshot and try again on the next tick
            warn!(%err, "failed to refresh network info");
        }
    }
}

/// Runs a single network info refresh.
///
/// `is_fetching` is raised for the duration of the request. On failure the
/// previous snapshot is left as it was.
pub async fn refresh_network_info<Q: NetworkInfoQuery + ?Sized>(
    client: &Q,
    status: &StatusChannel,
) -> QueryResult<()> {
    status.set_network_info_fetching(true);
    let res = client.network_tip().await;

    match res {
        Ok(tip) => {
            let info = apply_tip(status.get_network_info(), tip);
            debug!(block_height = %info.block_height, current_epoch = ?info.current_epoch, "got network tip");
            status.update_network_info(info);
            Ok(())
        }
        Err(err) => {
            status.set_network_info_fetching(false);
            Err(err)
        }
    }
}

/// Merges a tip snapshot into the previous network info. Protocol constants
/// the service did not report are carried over.
fn apply_tip(prev: NetworkInfo, tip: TipSnapshot) -> NetworkInfo {
    NetworkInfo {
        block_height: tip.block_height,
        current_epoch: tip.current_epoch,
        is_fetching: false,
        slots_per_epoch: tip.slots_per_epoch.unwrap_or(prev.slots_per_epoch),
        slot_duration_ms: tip.slot_duration_ms.unwrap_or(prev.slot_duration_ms),
    }
}

/// Polls the most recent blocks forever.
pub async fn latest_blocks_worker<Q: LatestBlocksQuery>(
    client: Arc<Q>,
    status: StatusChannel,
    limit: u32,
    poll_interval: Duration,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(err) = refresh_latest_blocks(client.as_ref(), &status, limit).await {
            warn!(%err, "failed to refresh latest blocks");
        }
    }
}

/// Runs a single latest blocks refresh. On failure the previous list is kept.
pub async fn refresh_latest_blocks<Q: LatestBlocksQuery + ?Sized>(
    client: &Q,
    status: &StatusChannel,
    limit: u32,
) -> QueryResult<()> {
    let blocks = client.latest_blocks(limit).await?;
    trace!(count = %blocks.len(), "got latest blocks");
    status.update_latest_blocks(blocks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chainview_query::QueryError;
    use chainview_test_utils::{block_record, FakeQueryService};

    use super::*;

    #[tokio::test]
    async fn test_refresh_network_info() {
        let service = FakeQueryService::new();
        service.set_tip(TipSnapshot {
            block_height: 120,
            current_epoch: Some(9),
            slots_per_epoch: Some(21_600),
            slot_duration_ms: None,
        });
        let status = StatusChannel::default();

        refresh_network_info(&service, &status).await.unwrap();

        let info = status.get_network_info();
        assert_eq!(info.block_height, 120);
        assert_eq!(info.current_epoch, Some(9));
        assert_eq!(info.slots_per_epoch, 21_600);
        assert_eq!(
            info.slot_duration_ms,
            NetworkInfo::default().slot_duration_ms
        );
        assert!(!info.is_fetching);
    }

    #[tokio::test]
    async fn test_refresh_network_info_failure_keeps_snapshot() {
        let service = FakeQueryService::new();
        service.fail_tip(QueryError::Timeout);
        let status = StatusChannel::new(NetworkInfo {
            block_height: 7,
            current_epoch: Some(1),
            ..Default::default()
        });

        let res = refresh_network_info(&service, &status).await;
        assert_eq!(res, Err(QueryError::Timeout));

        let info = status.get_network_info();
        assert_eq!(info.block_height, 7);
        assert_eq!(info.current_epoch, Some(1));
        assert!(!info.is_fetching);
    }

    #[tokio::test]
    async fn test_refresh_latest_blocks() {
        let service = FakeQueryService::new();
        service.set_blocks(vec![block_record(3, 300), block_record(2, 280)]);
        let status = StatusChannel::default();

        refresh_latest_blocks(&service, &status, 1).await.unwrap();

        let blocks = status.get_latest_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].number, Some(3));
    }
}
