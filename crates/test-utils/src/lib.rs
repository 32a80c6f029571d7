//! Fixtures and fakes shared by the workspace tests.

use chainview_primitives::prelude::*;
use chrono::{DateTime, Utc};

mod service;

pub use service::FakeQueryService;

/// Timestamp `secs` seconds after the unix epoch.
pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("test: timestamp in range")
}

/// Epoch record whose last block was seen at `last_block_secs`.
pub fn epoch_record(number: u64, last_block_secs: i64) -> EpochRecord {
    EpochRecord {
        number,
        started_at: ts(0),
        last_block_time: ts(last_block_secs),
        blocks_count: 20,
        transactions_count: 40,
        output: 1_000_000,
    }
}

/// Block record created at `created_at_secs`.
pub fn block_record(number: u64, created_at_secs: i64) -> BlockRecord {
    BlockRecord {
        number: Some(number),
        hash: format!("{number:064x}"),
        epoch_no: None,
        slot_no: Some(number * 20),
        created_at: ts(created_at_secs),
        transactions_count: 1,
    }
}

/// Epochs `upper..=lower`, most recent first, the same order the service
/// returns them in.
pub fn epochs_for_range(range: EpochRange) -> RawEpochs {
    (range.lower..=range.upper)
        .rev()
        .map(|number| Some(epoch_record(number, 100)))
        .collect()
}
