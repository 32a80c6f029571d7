//! Background reactions that keep the latest epochs fresh.
//!
//! Each reaction is a task that evaluates once on start and again whenever
//! one of the values it depends on changes. The shutdown flag is checked
//! before every evaluation, so nothing runs once polling is stopped, even if
//! a task had not been scheduled yet. Tasks only hold a weak reference to the
//! store and exit once it is gone.

use std::sync::{Arc, Weak};

use chainview_primitives::prelude::*;
use chainview_query::{traits::EpochsQuery, types::EpochsInRange, QueryState};
use tokio::sync::watch;
use tracing::*;

use crate::store::StoreInner;

/// Keeps the reaction tasks alive. Stopping or dropping it ends them.
#[derive(Debug)]
pub(crate) struct ReactionsHandle {
    shutdown: watch::Sender<bool>,
}

impl ReactionsHandle {
    pub(crate) fn spawn<Q: EpochsQuery>(inner: &Arc<StoreInner<Q>>) -> Self {
        let (shutdown, _) = watch::channel(false);

        tokio::spawn(block_height_reaction(
            Arc::downgrade(inner),
            inner.status.subscribe_network_info(),
            inner.subscribe_query_state(),
            shutdown.subscribe(),
        ));
        tokio::spawn(latest_block_date_reaction(
            Arc::downgrade(inner),
            inner.status.subscribe_latest_blocks(),
            inner.subscribe_latest_updates(),
            shutdown.subscribe(),
        ));

        Self { shutdown }
    }

    pub(crate) fn stop(self) {
        self.shutdown.send_replace(true);
    }
}

/// Re-fetches the latest epochs when the block height moves, re-evaluated on
/// every network info or query state change.
async fn block_height_reaction<Q: EpochsQuery>(
    inner: Weak<StoreInner<Q>>,
    mut network_rx: watch::Receiver<NetworkInfo>,
    mut query_rx: watch::Receiver<QueryState<EpochsInRange>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            break;
        }
        let Some(store) = inner.upgrade() else {
            break;
        };
        store.fetch_latest_epochs_on_block_height_change();
        drop(store);

        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            res = network_rx.changed() => if res.is_err() { break },
            res = query_rx.changed() => if res.is_err() { break },
        }
    }

    debug!("block height reaction exiting");
}

/// Patches the newest latest epoch with the date of the newest block,
/// re-evaluated on every change to either of them.
async fn latest_block_date_reaction<Q: EpochsQuery>(
    inner: Weak<StoreInner<Q>>,
    mut blocks_rx: watch::Receiver<Vec<BlockRecord>>,
    mut latest_rx: watch::Receiver<u64>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow_and_update() {
            break;
        }
        let Some(store) = inner.upgrade() else {
            break;
        };
        store.sync_latest_epoch_with_latest_block_date();
        drop(store);

        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            res = blocks_rx.changed() => if res.is_err() { break },
            res = latest_rx.changed() => if res.is_err() { break },
        }
    }

    debug!("latest block date reaction exiting");
}
