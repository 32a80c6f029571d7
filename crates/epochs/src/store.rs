use std::{future::Future, sync::Arc};

use chainview_primitives::prelude::*;
use chainview_query::{traits::EpochsQuery, types::EpochsInRange, QueryState, TrackedQuery};
use chainview_status::StatusChannel;
use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};
use tracing::*;

use crate::{memo::Memo, reactions::ReactionsHandle, transform::epoch_overviews};

/// Number of epochs kept in the latest window, the current one included.
pub const LATEST_EPOCHS_WINDOW: u64 = 5;

/// Store for browsed and latest epochs.
///
/// Cheap to clone, all clones share the same state.
pub struct EpochStore<Q> {
    inner: Arc<StoreInner<Q>>,
}

impl<Q> Clone for EpochStore<Q> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Q: EpochsQuery> EpochStore<Q> {
    pub fn new(client: Arc<Q>, status: StatusChannel) -> Self {
        let (latest_updates, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                client,
                query: TrackedQuery::new("epochs_in_range"),
                status,
                state: Mutex::new(EpochsState::default()),
                latest_updates,
                polling: Mutex::new(None),
            }),
        }
    }

    /// Fetches one page of epochs into the browsed set.
    ///
    /// Returns if the browsed set was replaced. A failed fetch leaves the
    /// previous page in place.
    pub async fn browse_epochs(&self, page: u64, per_page: u64) -> bool {
        let range = EpochRange::page(page, per_page);
        debug!(%page, %per_page, lower = %range.lower, upper = %range.upper, "browsing epochs");
        self.inner.fetch_into(range, Slot::Browsed).await
    }

    /// Fetches the window of the most recent epochs into the latest set.
    ///
    /// Returns if the latest set was replaced. Nothing is requested while the
    /// current epoch is unknown.
    pub async fn fetch_latest_epochs(&self) -> bool {
        match self.inner.start_latest_fetch() {
            Some(fetch) => fetch.await,
            None => false,
        }
    }

    /// Fetches the latest epochs if the block height moved since the last
    /// such fetch, returning the handle of the spawned fetch.
    pub fn fetch_latest_epochs_on_block_height_change(&self) -> Option<JoinHandle<bool>> {
        self.inner.fetch_latest_epochs_on_block_height_change()
    }

    /// Aligns the last block time of the newest latest epoch with the
    /// creation time of the newest known block. Returns if a patch was made.
    pub fn sync_latest_epoch_with_latest_block_date(&self) -> bool {
        self.inner.sync_latest_epoch_with_latest_block_date()
    }

    /// Starts the background reactions that keep the latest set fresh.
    /// Returns `false` if they were already running.
    pub fn start_polling_latest_epochs(&self) -> bool {
        let mut polling = self.inner.polling.lock();
        if polling.is_some() {
            return false;
        }

        *polling = Some(ReactionsHandle::spawn(&self.inner));
        info!("started polling latest epochs");
        true
    }

    /// Stops the background reactions. Fetches already in flight still land.
    /// Returns `false` if they were not running.
    pub fn stop_polling_latest_epochs(&self) -> bool {
        let Some(handle) = self.inner.polling.lock().take() else {
            return false;
        };

        handle.stop();
        info!("stopped polling latest epochs");
        true
    }

    pub fn is_polling_latest_epochs(&self) -> bool {
        self.inner.polling.lock().is_some()
    }

    /// Overviews of the browsed page.
    pub fn browsed_epochs(&self) -> Arc<Vec<EpochOverview>> {
        self.inner.overviews(Slot::Browsed)
    }

    /// Overviews of the latest window, most recent first.
    pub fn latest_epochs(&self) -> Arc<Vec<EpochOverview>> {
        self.inner.overviews(Slot::Latest)
    }

    pub fn is_loading_latest_epochs_first_time(&self) -> bool {
        !self.inner.query.has_been_executed_at_least_once()
            || self.inner.query.is_executing_the_first_time()
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.query.is_executing()
    }

    pub fn last_fetched_at_block_height(&self) -> u64 {
        self.inner.state.lock().last_fetched_at_block_height
    }

    pub fn latest_raw(&self) -> Option<RawEpochs> {
        self.inner.state.lock().latest.records.clone()
    }

    /// Subscribes to changes of the latest set. The value is a counter bumped
    /// on every replacement or patch.
    pub fn subscribe_latest_epochs(&self) -> watch::Receiver<u64> {
        self.inner.latest_updates.subscribe()
    }
}

pub(crate) struct StoreInner<Q> {
    client: Arc<Q>,
    query: TrackedQuery<EpochsInRange>,
    pub(crate) status: StatusChannel,
    state: Mutex<EpochsState>,
    latest_updates: watch::Sender<u64>,
    polling: Mutex<Option<ReactionsHandle>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Browsed,
    Latest,
}

/// Raw records of one slot together with a version bumped on every write.
#[derive(Debug, Default)]
struct EpochSlot {
    records: Option<RawEpochs>,
    version: u64,
}

impl EpochSlot {
    fn replace(&mut self, records: RawEpochs) -> u64 {
        self.records = Some(records);
        self.version += 1;
        self.version
    }
}

/// Inputs the overviews depend on besides the raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OverviewKey {
    version: u64,
    current_epoch: Option<u64>,
    slots_per_epoch: u64,
    slot_duration_ms: u64,
}

impl OverviewKey {
    fn new(version: u64, network: &NetworkInfo) -> Self {
        Self {
            version,
            current_epoch: network.current_epoch,
            slots_per_epoch: network.slots_per_epoch,
            slot_duration_ms: network.slot_duration_ms,
        }
    }
}

#[derive(Debug, Default)]
struct EpochsState {
    browsed: EpochSlot,
    latest: EpochSlot,
    last_fetched_at_block_height: u64,
    browsed_overviews: Memo<OverviewKey, Vec<EpochOverview>>,
    latest_overviews: Memo<OverviewKey, Vec<EpochOverview>>,
}

impl EpochsState {
    fn slot_mut(&mut self, slot: Slot) -> &mut EpochSlot {
        match slot {
            Slot::Browsed => &mut self.browsed,
            Slot::Latest => &mut self.latest,
        }
    }
}

impl<Q: EpochsQuery> StoreInner<Q> {
    /// Starts a tracked fetch of `range` whose result replaces `slot`.
    ///
    /// The query counts as executing as soon as this returns.
    fn fetch_into(
        self: &Arc<Self>,
        range: EpochRange,
        slot: Slot,
    ) -> impl Future<Output = bool> + Send + 'static {
        let client = self.client.clone();
        let request = self
            .query
            .execute(async move { client.epochs_in_range(range).await });
        let inner = self.clone();

        async move {
            let Some(res) = request.await else {
                return false;
            };
            inner.replace_slot(slot, res.epochs);
            true
        }
    }

    fn replace_slot(&self, slot: Slot, records: RawEpochs) {
        let count = records.len();
        let version = self.state.lock().slot_mut(slot).replace(records);
        trace!(?slot, %count, %version, "replaced epochs");

        if slot == Slot::Latest {
            self.latest_updates.send_replace(version);
        }
    }

    fn start_latest_fetch(self: &Arc<Self>) -> Option<impl Future<Output = bool> + Send + 'static> {
        let Some(current) = self.status.get_current_epoch() else {
            debug!("current epoch unknown, not fetching latest epochs");
            return None;
        };

        let range = EpochRange::trailing(current, LATEST_EPOCHS_WINDOW);
        Some(self.fetch_into(range, Slot::Latest))
    }

    pub(crate) fn fetch_latest_epochs_on_block_height_change(
        self: &Arc<Self>,
    ) -> Option<JoinHandle<bool>> {
        let network = self.status.get_network_info();
        let current = network.current_epoch?;

        let fetch = {
            let mut state = self.state.lock();
            if self.query.is_executing()
                || network.is_fetching
                || network.block_height == state.last_fetched_at_block_height
            {
                return None;
            }

            // Recorded before the fetch starts so that evaluations racing with
            // it see the new height.
            state.last_fetched_at_block_height = network.block_height;
            self.fetch_into(
                EpochRange::trailing(current, LATEST_EPOCHS_WINDOW),
                Slot::Latest,
            )
        };

        debug!(block_height = %network.block_height, %current, "block height changed, fetching latest epochs");
        Some(tokio::spawn(fetch))
    }

    pub(crate) fn sync_latest_epoch_with_latest_block_date(&self) -> bool {
        let Some(block) = self.status.get_latest_block() else {
            return false;
        };

        let version = {
            let mut state = self.state.lock();
            let slot = &mut state.latest;
            let Some(records) = slot.records.as_ref() else {
                return false;
            };

            // The first entry is taken to be the current epoch, which holds
            // as long as the service returns the window most recent first.
            let Some(Some(newest)) = records.first() else {
                return false;
            };
            if newest.last_block_time == block.created_at {
                return false;
            }

            let patched = newest.with_last_block_time(block.created_at);
            debug!(
                epoch = %patched.number,
                from = %newest.last_block_time,
                to = %block.created_at,
                "patching last block time of latest epoch"
            );

            let mut records = records.clone();
            records[0] = Some(patched);
            slot.replace(records)
        };

        self.latest_updates.send_replace(version);
        true
    }

    fn overviews(&self, slot: Slot) -> Arc<Vec<EpochOverview>> {
        let network = self.status.get_network_info();
        let mut state = self.state.lock();
        let state = &mut *state;

        let (records, memo) = match slot {
            Slot::Browsed => (&state.browsed, &mut state.browsed_overviews),
            Slot::Latest => (&state.latest, &mut state.latest_overviews),
        };

        let key = OverviewKey::new(records.version, &network);
        memo.get_or_compute(key, || epoch_overviews(records.records.as_deref(), &network))
    }

    pub(crate) fn subscribe_query_state(&self) -> watch::Receiver<QueryState<EpochsInRange>> {
        self.query.subscribe()
    }

    pub(crate) fn subscribe_latest_updates(&self) -> watch::Receiver<u64> {
        self.latest_updates.subscribe()
    }
}
