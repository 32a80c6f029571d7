use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Slots per epoch on the main network.
pub const DEFAULT_SLOTS_PER_EPOCH: u64 = 432_000;

/// Slot length on the main network.
pub const DEFAULT_SLOT_DURATION_MS: u64 = 1_000;

/// Snapshot of the chain tip as seen by the network info provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Height of the most recent block.
    pub block_height: u64,

    /// Epoch the tip is in, unknown until the first successful poll.
    pub current_epoch: Option<u64>,

    /// If a refresh of this snapshot is in flight.
    pub is_fetching: bool,

    pub slots_per_epoch: u64,

    pub slot_duration_ms: u64,
}

impl NetworkInfo {
    /// Wall-clock length of a full epoch.
    pub fn epoch_length(&self) -> TimeDelta {
        let ms = self.slots_per_epoch.saturating_mul(self.slot_duration_ms);
        TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
    }
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self {
            block_height: 0,
            current_epoch: None,
            is_fetching: false,
            slots_per_epoch: DEFAULT_SLOTS_PER_EPOCH,
            slot_duration_ms: DEFAULT_SLOT_DURATION_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_length() {
        let info = NetworkInfo::default();
        assert_eq!(info.epoch_length(), TimeDelta::days(5));
    }
}
