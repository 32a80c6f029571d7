use chainview_primitives::network::{DEFAULT_SLOTS_PER_EPOCH, DEFAULT_SLOT_DURATION_MS};
use serde::{Deserialize, Serialize};

/// Default value for `request_timeout_ms` in [`ClientConfig`].
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default value for `per_page` in [`EpochsConfig`].
const DEFAULT_PER_PAGE: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// GraphQL endpoint of the query service.
    pub graphql_url: String,

    /// Timeout applied to every query.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Configuration for the network info and latest blocks pollers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    /// How often to refresh the network info, in ms.
    pub network_info_poll_ms: u64,
    /// How often to refresh the latest blocks list, in ms.
    pub latest_blocks_poll_ms: u64,
    /// How many of the most recent blocks to keep.
    pub latest_blocks_limit: u32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            network_info_poll_ms: 5_000,
            latest_blocks_poll_ms: 5_000,
            latest_blocks_limit: 10,
        }
    }
}

/// Protocol constants used until the service reports its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub slots_per_epoch: u64,
    pub slot_duration_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            slots_per_epoch: DEFAULT_SLOTS_PER_EPOCH,
            slot_duration_ms: DEFAULT_SLOT_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpochsConfig {
    /// Page size used when browsing epochs.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_per_page() -> u64 {
    DEFAULT_PER_PAGE
}

impl Default for EpochsConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub epochs: EpochsConfig,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_load() {
        let config_string = r#"
            [client]
            graphql_url = "http://localhost:3100/graphql"
            request_timeout_ms = 2000

            [status]
            network_info_poll_ms = 1000
            latest_blocks_poll_ms = 3000
            latest_blocks_limit = 5

            [network]
            slots_per_epoch = 21600
            slot_duration_ms = 20000

            [epochs]
            per_page = 25
        "#;

        let config = toml::from_str::<Config>(config_string);
        assert!(
            config.is_ok(),
            "should be able to load TOML config but got: {:?}",
            config.err()
        );

        let config = config.unwrap();
        assert_eq!(config.client.request_timeout_ms, 2000);
        assert_eq!(config.status.latest_blocks_limit, 5);
        assert_eq!(config.network.slots_per_epoch, 21600);
        assert_eq!(config.epochs.per_page, 25);
    }

    #[test]
    fn test_config_defaults() {
        let config_string = r#"
            [client]
            graphql_url = "http://localhost:3100/graphql"
        "#;

        let config = toml::from_str::<Config>(config_string).unwrap();
        assert_eq!(
            config.client.request_timeout_ms,
            DEFAULT_REQUEST_TIMEOUT_MS
        );
        assert_eq!(config.status, StatusConfig::default());
        assert_eq!(config.network, NetworkConfig::default());
        assert_eq!(config.epochs.per_page, DEFAULT_PER_PAGE);
    }
}
