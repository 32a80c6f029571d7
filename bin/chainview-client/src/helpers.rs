use std::fs;

use chainview_config::Config;
use format_serde_error::SerdeError;

use crate::{
    args::{apply_override, parse_override, Args},
    errors::InitError,
};

/// Loads the config file and applies the command line overrides on top.
pub fn get_config(args: &Args) -> Result<Config, InitError> {
    let config_str = fs::read_to_string(&args.config)?;
    parse_config(config_str, &args.get_overrides())
}

fn parse_config(config_str: String, overrides: &[String]) -> Result<Config, InitError> {
    let mut raw = toml::from_str::<toml::Value>(&config_str)
        .map_err(|err| SerdeError::new(config_str.clone(), err))?;

    if let Some(table) = raw.as_table_mut() {
        for ovr in overrides {
            let (path, value) = parse_override(ovr)?;
            apply_override(&path, value, table)?;
        }
    }

    let config = raw
        .try_into::<Config>()
        .map_err(|err| SerdeError::new(config_str, err))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [client]
        graphql_url = "http://localhost:3100/graphql"

        [epochs]
        per_page = 15
    "#;

    #[test]
    fn test_parse_config_with_overrides() {
        let overrides = vec![
            "client.request_timeout_ms=500".to_string(),
            "status.network_info_poll_ms=100".to_string(),
            "status.latest_blocks_poll_ms=200".to_string(),
            "status.latest_blocks_limit=4".to_string(),
        ];

        let config = parse_config(CONFIG.to_string(), &overrides).unwrap();
        assert_eq!(config.client.request_timeout_ms, 500);
        assert_eq!(config.status.network_info_poll_ms, 100);
        assert_eq!(config.status.latest_blocks_limit, 4);
        assert_eq!(config.epochs.per_page, 15);
    }

    #[test]
    fn test_parse_config_rejects_bad_input() {
        let res = parse_config("[client".to_string(), &[]);
        assert!(matches!(res, Err(InitError::MalformedConfig(_))));

        let res = parse_config(CONFIG.to_string(), &["client.graphql_url".to_string()]);
        assert!(matches!(res, Err(InitError::Config(_))));

        // wrong type for a known field
        let res = parse_config(
            CONFIG.to_string(),
            &["epochs.per_page=many".to_string()],
        );
        assert!(matches!(res, Err(InitError::MalformedConfig(_))));
    }
}
