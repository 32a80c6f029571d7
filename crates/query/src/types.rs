//! Query documents and the shapes of their `data` payloads.

use chainview_primitives::prelude::*;
use serde::{Deserialize, Serialize};

pub const EPOCHS_IN_RANGE_OPERATION: &str = "epochsInRange";

/// Epochs with `lower <= number <= upper`, most recent first.
pub const EPOCHS_IN_RANGE_QUERY: &str = r#"
query epochsInRange($lower: Int!, $upper: Int!) {
  epochs(
    where: { _and: [{ number: { _gte: $lower } }, { number: { _lte: $upper } }] }
    order_by: { number: desc }
  ) {
    number
    startedAt
    lastBlockTime
    blocksCount
    transactionsCount
    output
  }
}
"#;

pub const NETWORK_INFO_OPERATION: &str = "networkInfo";

pub const NETWORK_INFO_QUERY: &str = r#"
query networkInfo {
  cardano {
    tip {
      number
      epochNo
    }
  }
  genesis {
    shelley {
      epochLength
      slotLength
    }
  }
}
"#;

pub const LATEST_BLOCKS_OPERATION: &str = "latestBlocks";

/// Most recent blocks first. `forgedAt` is aliased to `createdAt`.
pub const LATEST_BLOCKS_QUERY: &str = r#"
query latestBlocks($limit: Int!) {
  blocks(limit: $limit, order_by: { number: desc_nulls_last }) {
    number
    hash
    epochNo
    slotNo
    createdAt: forgedAt
    transactionsCount
  }
}
"#;

/// `data` payload of [`EPOCHS_IN_RANGE_QUERY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochsInRange {
    pub epochs: RawEpochs,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LatestBlocksVars {
    pub limit: u32,
}

/// `data` payload of [`LATEST_BLOCKS_QUERY`].
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LatestBlocksData {
    pub blocks: Vec<BlockRecord>,
}

/// `data` payload of [`NETWORK_INFO_QUERY`].
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NetworkInfoData {
    pub cardano: CardanoData,
    pub genesis: Option<GenesisData>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CardanoData {
    pub tip: TipData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TipData {
    pub number: Option<u64>,
    pub epoch_no: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenesisData {
    pub shelley: Option<ShelleyGenesisData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShelleyGenesisData {
    pub epoch_length: u64,
    /// Slot length in seconds.
    pub slot_length: f64,
}

/// Chain tip and protocol constants reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TipSnapshot {
    pub block_height: u64,
    pub current_epoch: Option<u64>,
    pub slots_per_epoch: Option<u64>,
    pub slot_duration_ms: Option<u64>,
}

impl From<NetworkInfoData> for TipSnapshot {
    fn from(data: NetworkInfoData) -> Self {
        let shelley = data.genesis.and_then(|g| g.shelley);
        Self {
            block_height: data.cardano.tip.number.unwrap_or_default(),
            current_epoch: data.cardano.tip.epoch_no,
            slots_per_epoch: shelley.as_ref().map(|s| s.epoch_length),
            slot_duration_ms: shelley.map(|s| (s.slot_length * 1_000.0).round() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tip_snapshot_from_network_info() {
        let json = r#"{
            "cardano": { "tip": { "number": 4890123, "epochNo": 215 } },
            "genesis": { "shelley": { "epochLength": 432000, "slotLength": 1 } }
        }"#;

        let data: NetworkInfoData = serde_json::from_str(json).unwrap();
        let tip = TipSnapshot::from(data);
        assert_eq!(tip.block_height, 4_890_123);
        assert_eq!(tip.current_epoch, Some(215));
        assert_eq!(tip.slots_per_epoch, Some(432_000));
        assert_eq!(tip.slot_duration_ms, Some(1_000));
    }

    #[test]
    fn test_tip_snapshot_without_genesis() {
        let json = r#"{ "cardano": { "tip": { "number": null, "epochNo": null } }, "genesis": null }"#;

        let data: NetworkInfoData = serde_json::from_str(json).unwrap();
        assert_eq!(TipSnapshot::from(data), TipSnapshot::default());
    }

    #[test]
    fn test_epochs_with_null_entries() {
        let json = r#"{
            "epochs": [
                null,
                {
                    "number": 3,
                    "startedAt": "2020-01-01T00:00:00Z",
                    "lastBlockTime": "2020-01-02T00:00:00Z",
                    "blocksCount": "10",
                    "transactionsCount": "4",
                    "output": "1000"
                }
            ]
        }"#;

        let data: EpochsInRange = serde_json::from_str(json).unwrap();
        assert_eq!(data.epochs.len(), 2);
        assert!(data.epochs[0].is_none());
        assert_eq!(data.epochs[1].as_ref().map(|e| e.number), Some(3));
    }
}
