use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chainview_primitives::prelude::*;
use chainview_query::{
    traits::{EpochsQuery, LatestBlocksQuery, NetworkInfoQuery},
    types::{EpochsInRange, TipSnapshot},
    QueryError, QueryResult,
};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::epochs_for_range;

/// In-memory stand-in for the GraphQL service.
///
/// Epoch responses are taken from a queue and fall back to generated records
/// for the requested range. While paused, epoch requests park until
/// [`FakeQueryService::release`] hands out permits.
#[derive(Debug)]
pub struct FakeQueryService {
    epoch_calls: Mutex<Vec<EpochRange>>,
    epoch_responses: Mutex<VecDeque<QueryResult<EpochsInRange>>>,
    paused: AtomicBool,
    gate: Semaphore,
    tip: Mutex<Option<QueryResult<TipSnapshot>>>,
    blocks: Mutex<Vec<BlockRecord>>,
}

impl FakeQueryService {
    pub fn new() -> Self {
        Self {
            epoch_calls: Mutex::default(),
            epoch_responses: Mutex::default(),
            paused: AtomicBool::new(false),
            gate: Semaphore::new(0),
            tip: Mutex::default(),
            blocks: Mutex::default(),
        }
    }

    /// Queues the response for the next epoch request.
    pub fn push_epochs_response(&self, res: QueryResult<EpochsInRange>) {
        self.epoch_responses.lock().push_back(res);
    }

    /// Every range requested so far, in call order.
    pub fn epoch_calls(&self) -> Vec<EpochRange> {
        self.epoch_calls.lock().clone()
    }

    pub fn epoch_call_count(&self) -> usize {
        self.epoch_calls.lock().len()
    }

    /// Makes subsequent epoch requests wait for [`Self::release`].
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Lets `n` parked epoch requests through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn set_tip(&self, tip: TipSnapshot) {
        *self.tip.lock() = Some(Ok(tip));
    }

    pub fn fail_tip(&self, err: QueryError) {
        *self.tip.lock() = Some(Err(err));
    }

    pub fn set_blocks(&self, blocks: Vec<BlockRecord>) {
        *self.blocks.lock() = blocks;
    }
}

impl Default for FakeQueryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EpochsQuery for FakeQueryService {
    async fn epochs_in_range(&self, range: EpochRange) -> QueryResult<EpochsInRange> {
        self.epoch_calls.lock().push(range);

        if self.paused.load(Ordering::SeqCst) {
            self.gate
                .acquire()
                .await
                .map_err(|e| QueryError::Other(e.to_string()))?
                .forget();
        }

        let queued = self.epoch_responses.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(EpochsInRange {
                epochs: epochs_for_range(range),
            })
        })
    }
}

#[async_trait]
impl NetworkInfoQuery for FakeQueryService {
    async fn network_tip(&self) -> QueryResult<TipSnapshot> {
        self.tip
            .lock()
            .clone()
            .unwrap_or_else(|| Err(QueryError::Other("no tip set".to_string())))
    }
}

#[async_trait]
impl LatestBlocksQuery for FakeQueryService {
    async fn latest_blocks(&self, limit: u32) -> QueryResult<Vec<BlockRecord>> {
        let blocks = self.blocks.lock();
        Ok(blocks.iter().take(limit as usize).cloned().collect())
    }
}
