use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// Sequence of epoch entries as returned by the query service. Individual
/// entries can be `null` when the service only partially resolves a range.
pub type RawEpochs = Vec<Option<EpochRecord>>;

/// Epoch entry as returned by the query service.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochRecord {
    /// Epoch number.
    pub number: u64,

    /// Time the first block of the epoch was created.
    pub started_at: DateTime<Utc>,

    /// Time of the most recent block seen in this epoch.
    pub last_block_time: DateTime<Utc>,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub blocks_count: u64,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub transactions_count: u64,

    /// Sum of all transaction outputs in the epoch, in the smallest unit.
    /// The service encodes this as a decimal string since it can overflow
    /// JSON numbers.
    #[serde_as(as = "DisplayFromStr")]
    pub output: u128,
}

impl EpochRecord {
    /// Returns a copy of this record with `last_block_time` replaced.
    pub fn with_last_block_time(&self, last_block_time: DateTime<Utc>) -> Self {
        Self {
            last_block_time,
            ..self.clone()
        }
    }
}

/// Inclusive range of epoch numbers, sent as the `lower`/`upper` query
/// variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpochRange {
    pub lower: u64,
    pub upper: u64,
}

impl EpochRange {
    pub fn new(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }

    /// Window of `len` epochs ending at `upper`, clamped at epoch 0.
    pub fn trailing(upper: u64, len: u64) -> Self {
        let lower = upper.saturating_sub(len.saturating_sub(1));
        Self { lower, upper }
    }

    /// Window covering the given 1-based page, `upper = page * per_page` and
    /// `lower = upper - per_page`.
    ///
    /// Pages are not bounds checked. Bounds are unsigned, so page 0 does not
    /// produce the negative window the formula gives: `lower` saturates and
    /// the degenerate `[0, 0]` window is sent instead. It is up to the
    /// service to deal with it.
    pub fn page(page: u64, per_page: u64) -> Self {
        let upper = page.saturating_mul(per_page);
        let lower = upper.saturating_sub(per_page);
        Self { lower, upper }
    }
}

/// Display-ready summary of an epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochOverview {
    pub number: u64,
    pub started_at: DateTime<Utc>,
    /// Scheduled end of the epoch, derived from the protocol epoch length.
    pub ended_at: DateTime<Utc>,
    pub last_block_at: DateTime<Utc>,
    pub blocks_count: u64,
    pub transactions_count: u64,
    pub output: u128,
    pub slots_count: u64,
    /// Progress through the epoch in percent, `100.0` once it is over.
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_window() {
        assert_eq!(EpochRange::trailing(10, 5), EpochRange::new(6, 10));
        assert_eq!(EpochRange::trailing(4, 5), EpochRange::new(0, 4));
        assert_eq!(EpochRange::trailing(0, 5), EpochRange::new(0, 0));
    }

    #[test]
    fn test_page_window() {
        assert_eq!(EpochRange::page(1, 10), EpochRange::new(0, 10));
        assert_eq!(EpochRange::page(3, 7), EpochRange::new(14, 21));
        assert_eq!(EpochRange::page(0, 10), EpochRange::new(0, 0));
    }

    #[test]
    fn test_deserialize_service_record() {
        let json = r#"{
            "number": 212,
            "startedAt": "2020-08-28T21:44:51Z",
            "lastBlockTime": "2020-09-02T21:44:31Z",
            "blocksCount": "21296",
            "transactionsCount": 62391,
            "output": "194561718302916417"
        }"#;

        let record: EpochRecord = serde_json::from_str(json).expect("test: parse record");
        assert_eq!(record.number, 212);
        assert_eq!(record.blocks_count, 21296);
        assert_eq!(record.transactions_count, 62391);
        assert_eq!(record.output, 194_561_718_302_916_417);
    }

    #[test]
    fn test_with_last_block_time_keeps_identity() {
        let record = EpochRecord {
            number: 7,
            started_at: DateTime::from_timestamp(0, 0).unwrap(),
            last_block_time: DateTime::from_timestamp(100, 0).unwrap(),
            blocks_count: 1,
            transactions_count: 2,
            output: 3,
        };

        let patched = record.with_last_block_time(DateTime::from_timestamp(200, 0).unwrap());
        assert_eq!(patched.number, record.number);
        assert_eq!(patched.last_block_time.timestamp(), 200);
        assert_eq!(record.last_block_time.timestamp(), 100);
    }
}
