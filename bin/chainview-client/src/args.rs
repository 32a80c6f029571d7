use std::path::PathBuf;

use argh::FromArgs;
use toml::value::Table;

use crate::errors::ConfigError;

#[derive(Debug, Clone, FromArgs)]
#[argh(description = "Chainview epochs client")]
pub struct Args {
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: PathBuf,

    /// GraphQL endpoint that will override the url in the config toml.
    #[argh(option, description = "graphql endpoint url")]
    pub graphql_url: Option<String>,

    /// Page size that will override the one in the config toml.
    #[argh(option, description = "epochs per page")]
    pub per_page: Option<u64>,

    /// Page of epochs to fetch once on startup.
    #[argh(option, description = "epochs page to browse on startup")]
    pub browse_page: Option<u64>,

    /// Other generic overrides to the config toml.
    /// Will be used, for example, as `-o status.network_info_poll_ms=1000 -o epochs.per_page=20`
    #[argh(option, short = 'o', description = "generic config overrides")]
    pub overrides: Vec<String>,
}

impl Args {
    /// Get strings of overrides gathered from args.
    pub fn get_overrides(&self) -> Vec<String> {
        let mut overrides = self.overrides.clone();
        overrides.extend(self.get_direct_overrides());
        overrides
    }

    /// Overrides passed directly as args and not as overrides.
    fn get_direct_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();
        if let Some(url) = &self.graphql_url {
            overrides.push(format!("client.graphql_url={url}"));
        }
        if let Some(per_page) = &self.per_page {
            overrides.push(format!("epochs.per_page={per_page}"));
        }
        overrides
    }
}

type Override = (String, toml::Value);

/// Splits an override into its dotted key path and parsed value.
pub fn parse_override(override_str: &str) -> Result<Override, ConfigError> {
    let (key, value_str) = override_str
        .split_once('=')
        .ok_or(ConfigError::InvalidOverride(override_str.to_string()))?;
    Ok((key.to_string(), parse_value(value_str)))
}

/// Apply override to config. Intermediate tables that do not exist yet are
/// created, so sections left to their defaults can still be overridden.
pub fn apply_override(
    path: &str,
    value: toml::Value,
    table: &mut Table,
) -> Result<(), ConfigError> {
    match path.split_once('.') {
        None => {
            table.insert(path.to_string(), value);
            Ok(())
        }
        Some((key, rest)) => {
            let entry = table
                .entry(key.to_string())
                .or_insert_with(|| toml::Value::Table(Table::new()));
            match entry.as_table_mut() {
                Some(t) => apply_override(rest, value, t),
                None => Err(ConfigError::TraverseNonTableAt(key.to_string())),
            }
        }
    }
}

/// Parses a string into a toml value. First tries as `i64`, then as `bool` and then defaults to
/// `String`.
fn parse_value(str_value: &str) -> toml::Value {
    str_value
        .parse::<i64>()
        .map(toml::Value::Integer)
        .or_else(|_| str_value.parse::<bool>().map(toml::Value::Boolean))
        .unwrap_or_else(|_| toml::Value::String(str_value.to_string()))
}

#[cfg(test)]
mod test {
    use chainview_config::{ClientConfig, Config};

    use super::*;

    fn get_config() -> Config {
        Config {
            client: ClientConfig {
                graphql_url: "http://localhost:3100/graphql".to_string(),
                request_timeout_ms: 1_000,
            },
            status: Default::default(),
            network: Default::default(),
            epochs: Default::default(),
        }
    }

    fn args(overrides: &[&str]) -> Args {
        Args {
            config: "config_path".into(),
            graphql_url: Some("http://explorer:3100/graphql".to_string()),
            per_page: None,
            browse_page: Some(2),
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_apply_override() {
        let config = get_config();
        let mut toml = toml::Value::try_from(&config).unwrap();
        let table = toml.as_table_mut().unwrap();
        let args = args(&[
            "status.latest_blocks_limit=3",
            "network.slots_per_epoch=21600",
            "epochs.per_page=25",
        ]);

        for (path, val) in args
            .get_overrides()
            .into_iter()
            .map(|x| parse_override(&x).unwrap())
        {
            apply_override(&path, val, table).unwrap();
        }

        let new_config: Config = toml.try_into().unwrap();
        assert_eq!(new_config.status.latest_blocks_limit, 3);
        assert_eq!(new_config.network.slots_per_epoch, 21600);
        assert_eq!(new_config.epochs.per_page, 25);
        assert_eq!(
            &new_config.client.graphql_url,
            "http://explorer:3100/graphql"
        );
    }

    #[test]
    fn test_direct_overrides_win() {
        let mut args = args(&["epochs.per_page=25"]);
        args.per_page = Some(40);

        let overrides = args.get_overrides();
        assert_eq!(overrides.last().map(String::as_str), Some("epochs.per_page=40"));
    }

    #[test]
    fn test_invalid_overrides() {
        assert!(matches!(
            parse_override("client.graphql_url"),
            Err(ConfigError::InvalidOverride(_))
        ));

        let mut table = Table::new();
        table.insert("client".to_string(), toml::Value::Integer(1));
        let (path, val) = parse_override("client.request_timeout_ms=5").unwrap();
        assert!(matches!(
            apply_override(&path, val, &mut table),
            Err(ConfigError::TraverseNonTableAt(_))
        ));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("12"), toml::Value::Integer(12));
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(
            parse_value("http://x:1/graphql"),
            toml::Value::String("http://x:1/graphql".to_string())
        );
    }
}
