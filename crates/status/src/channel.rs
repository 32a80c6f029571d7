use std::sync::Arc;

use chainview_primitives::prelude::*;
use tokio::sync::watch;
use tracing::*;

/// Shared handle to the network info and latest blocks watchers.
///
/// Updates that do not change the stored value are swallowed so subscribers
/// only wake up on real changes.
#[derive(Clone, Debug)]
pub struct StatusChannel {
    network: Arc<watch::Sender<NetworkInfo>>,
    blocks: Arc<watch::Sender<Vec<BlockRecord>>>,
}

impl StatusChannel {
    pub fn new(network_info: NetworkInfo) -> Self {
        let (network, _) = watch::channel(network_info);
        let (blocks, _) = watch::channel(Vec::new());
        Self {
            network: Arc::new(network),
            blocks: Arc::new(blocks),
        }
    }

    // Receiver methods

    /// Gets the latest [`NetworkInfo`].
    pub fn get_network_info(&self) -> NetworkInfo {
        self.network.borrow().clone()
    }

    pub fn get_current_epoch(&self) -> Option<u64> {
        self.network.borrow().current_epoch
    }

    pub fn is_network_info_fetching(&self) -> bool {
        self.network.borrow().is_fetching
    }

    /// Gets the most recently fetched block list, most recent first.
    pub fn get_latest_blocks(&self) -> Vec<BlockRecord> {
        self.blocks.borrow().clone()
    }

    /// Gets the most recent block, if any has been fetched.
    pub fn get_latest_block(&self) -> Option<BlockRecord> {
        self.blocks.borrow().first().cloned()
    }

    // Subscription functions.

    pub fn subscribe_network_info(&self) -> watch::Receiver<NetworkInfo> {
        self.network.subscribe()
    }

    pub fn subscribe_latest_blocks(&self) -> watch::Receiver<Vec<BlockRecord>> {
        self.blocks.subscribe()
    }

    // Sender methods

    /// Replaces the network info. Returns whether anything changed.
    pub fn update_network_info(&self, info: NetworkInfo) -> bool {
        let changed = self.network.send_if_modified(|cur| {
            if *cur == info {
                return false;
            }
            *cur = info;
            true
        });
        if changed {
            trace!(info = ?*self.network.borrow(), "network info updated");
        }
        changed
    }

    /// Flags whether a network info refresh is in flight.
    pub fn set_network_info_fetching(&self, is_fetching: bool) -> bool {
        self.network.send_if_modified(|cur| {
            if cur.is_fetching == is_fetching {
                return false;
            }
            cur.is_fetching = is_fetching;
            true
        })
    }

    /// Replaces the latest blocks list. Returns whether anything changed.
    pub fn update_latest_blocks(&self, blocks: Vec<BlockRecord>) -> bool {
        self.blocks.send_if_modified(|cur| {
            if *cur == blocks {
                return false;
            }
            *cur = blocks;
            true
        })
    }
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new(NetworkInfo::default())
    }
}

#[cfg(test)]
mod tests {
    use chainview_test_utils::block_record;

    use super::*;

    #[test]
    fn test_update_network_info_only_notifies_on_change() {
        let status = StatusChannel::default();
        let mut rx = status.subscribe_network_info();

        let info = NetworkInfo {
            block_height: 10,
            current_epoch: Some(2),
            ..Default::default()
        };
        assert!(status.update_network_info(info.clone()));
        assert!(rx.has_changed().unwrap());
        let _ = rx.borrow_and_update();

        assert!(!status.update_network_info(info));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_fetching_flag() {
        let status = StatusChannel::default();
        assert!(status.set_network_info_fetching(true));
        assert!(status.is_network_info_fetching());
        assert!(!status.set_network_info_fetching(true));
        assert!(status.set_network_info_fetching(false));
    }

    #[test]
    fn test_latest_block_is_first() {
        let status = StatusChannel::default();
        assert!(status.get_latest_block().is_none());

        status.update_latest_blocks(vec![block_record(11, 200), block_record(10, 180)]);
        let latest = status.get_latest_block().unwrap();
        assert_eq!(latest.number, Some(11));
        assert_eq!(status.get_latest_blocks().len(), 2);
    }
}
