//! Derivation of [`EpochOverview`]s from raw epoch records.

use chainview_primitives::prelude::*;
use chrono::{DateTime, Utc};

/// Builds the overview of a single epoch.
pub fn epoch_overview(epoch: &EpochRecord, network: &NetworkInfo) -> EpochOverview {
    let ended_at = epoch
        .started_at
        .checked_add_signed(network.epoch_length())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    EpochOverview {
        number: epoch.number,
        started_at: epoch.started_at,
        ended_at,
        last_block_at: epoch.last_block_time,
        blocks_count: epoch.blocks_count,
        transactions_count: epoch.transactions_count,
        output: epoch.output,
        slots_count: elapsed_slots(epoch, network),
        percentage: epoch_progress(epoch, network),
    }
}

/// Progress through an epoch in percent.
///
/// Epochs before the current one are complete. Otherwise this is the time
/// between the start of the epoch and its last block over the epoch length,
/// clamped to `[0, 100]`.
pub fn epoch_progress(epoch: &EpochRecord, network: &NetworkInfo) -> f64 {
    if is_finished(epoch, network) {
        return 100.0;
    }

    let total_ms = network.epoch_length().num_milliseconds();
    if total_ms <= 0 {
        return 100.0;
    }

    let elapsed_ms = (epoch.last_block_time - epoch.started_at).num_milliseconds();
    (elapsed_ms as f64 / total_ms as f64 * 100.0).clamp(0.0, 100.0)
}

/// Maps a raw sequence to overviews, dropping `null` entries.
pub fn epoch_overviews(
    epochs: Option<&[Option<EpochRecord>]>,
    network: &NetworkInfo,
) -> Vec<EpochOverview> {
    epochs
        .unwrap_or_default()
        .iter()
        .flatten()
        .map(|epoch| epoch_overview(epoch, network))
        .collect()
}

fn is_finished(epoch: &EpochRecord, network: &NetworkInfo) -> bool {
    network
        .current_epoch
        .is_some_and(|current| epoch.number < current)
}

fn elapsed_slots(epoch: &EpochRecord, network: &NetworkInfo) -> u64 {
    if is_finished(epoch, network) || network.slot_duration_ms == 0 {
        return network.slots_per_epoch;
    }

    let elapsed_ms = (epoch.last_block_time - epoch.started_at)
        .num_milliseconds()
        .max(0) as u64;
    (elapsed_ms / network.slot_duration_ms).min(network.slots_per_epoch)
}

#[cfg(test)]
mod tests {
    use chainview_test_utils::{epoch_record, ts};

    use super::*;

    fn network(current_epoch: u64) -> NetworkInfo {
        NetworkInfo {
            block_height: 1_000,
            current_epoch: Some(current_epoch),
            ..Default::default()
        }
    }

    #[test]
    fn test_preserves_epoch_number() {
        for number in [0, 1, 9, 10, 250] {
            let overview = epoch_overview(&epoch_record(number, 100), &network(10));
            assert_eq!(overview.number, number);
        }
    }

    #[test]
    fn test_finished_epoch() {
        let overview = epoch_overview(&epoch_record(9, 100), &network(10));
        assert_eq!(overview.percentage, 100.0);
        assert_eq!(overview.slots_count, 432_000);
        assert_eq!(overview.ended_at, ts(432_000));
        assert_eq!(overview.last_block_at, ts(100));
    }

    #[test]
    fn test_current_epoch_progress() {
        let overview = epoch_overview(&epoch_record(10, 216_000), &network(10));
        assert_eq!(overview.percentage, 50.0);
        assert_eq!(overview.slots_count, 216_000);
    }

    #[test]
    fn test_progress_is_clamped() {
        let overview = epoch_overview(&epoch_record(10, 900_000), &network(10));
        assert_eq!(overview.percentage, 100.0);
        assert_eq!(overview.slots_count, 432_000);

        // last block before the recorded start
        let mut epoch = epoch_record(10, 0);
        epoch.started_at = ts(50);
        assert_eq!(epoch_progress(&epoch, &network(10)), 0.0);
    }

    #[test]
    fn test_overviews_skip_null_entries() {
        let raw = vec![Some(epoch_record(10, 100)), None, Some(epoch_record(8, 100))];
        let overviews = epoch_overviews(Some(raw.as_slice()), &network(10));
        let numbers: Vec<_> = overviews.iter().map(|o| o.number).collect();
        assert_eq!(numbers, vec![10, 8]);

        assert!(epoch_overviews(None, &network(10)).is_empty());
    }
}
