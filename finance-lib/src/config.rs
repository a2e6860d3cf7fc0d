use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_MAX_POOL_SIZE: u32 = 10;

#[derive(Deserialize, Debug, PartialEq)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// OTLP trace export. `api_key` is sent in the `x-honeycomb-team` header.
#[derive(Deserialize, Debug, PartialEq)]
pub struct TelemetryConfig {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub signups_enabled: bool,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    pub ssl: Option<SSLConfig>,
    pub telemetry: Option<TelemetryConfig>,
}

fn default_max_pool_size() -> u32 {
    DEFAULT_MAX_POOL_SIZE
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_owned()
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Config::from_toml(&config)
    }

    pub fn from_toml(config: &str) -> Result<Config, anyhow::Error> {
        toml::from_str(config).context("Unable to parse config")
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let signups_enabled = read_env("SIGNUPS_ENABLED")?
            .parse::<bool>()
            .context("Unable to parse SIGNUPS_ENABLED value")?;
        let database_url = read_env("DATABASE_URL")?;
        let max_pool_size = match env::var("MAX_POOL_SIZE") {
            Ok(size) => size
                .parse::<u32>()
                .context("Unable to parse MAX_POOL_SIZE value")?,
            Err(_) => DEFAULT_MAX_POOL_SIZE,
        };
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| default_bind_address());

        Ok(Config {
            database_url,
            signups_enabled,
            max_pool_size,
            bind_address,
            ssl: None,
            telemetry: None,
        })
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}

#[cfg(test)]
mod tests {
    use super::{Config, SSLConfig, TelemetryConfig};
    use std::path::PathBuf;

    #[test]
    fn minimal_config() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://localhost/finance"
            signups_enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/finance");
        assert!(config.signups_enabled);
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.ssl, None);
        assert_eq!(config.telemetry, None);
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://localhost/finance"
            signups_enabled = false
            max_pool_size = 4
            bind_address = "127.0.0.1:9000"

            [ssl]
            private_key_file = "/etc/finance/key.pem"
            certificate_chain_file = "/etc/finance/chain.pem"

            [telemetry]
            endpoint = "https://api.honeycomb.io"
            api_key = "key"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(
            config.ssl,
            Some(SSLConfig {
                private_key_file: PathBuf::from("/etc/finance/key.pem"),
                certificate_chain_file: PathBuf::from("/etc/finance/chain.pem"),
            })
        );
        assert_eq!(
            config.telemetry,
            Some(TelemetryConfig {
                endpoint: "https://api.honeycomb.io".to_string(),
                api_key: "key".to_string(),
            })
        );
    }

    #[test]
    fn missing_database_url() {
        assert!(Config::from_toml("signups_enabled = true").is_err());
    }
}
