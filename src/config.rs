// src/config.rs
use crate::debounce::DEFAULT_DELAY;
use crate::error::ConfigError;
use crate::provider::ProviderClient;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:3030";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-compare/0.1)";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub provider_base_url: String,
    pub user_agent: String,
    pub debounce_delay: Duration,
}

impl Config {
    /// Reads settings from the environment. Call `dotenv` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_value = lookup("STOCK_COMPARE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_value
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "STOCK_COMPARE_ADDR",
                value: addr_value.clone(),
            })?;

        let debounce_delay = match lookup("DEBOUNCE_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue {
                    key: "DEBOUNCE_MS",
                    value,
                })?,
            None => DEFAULT_DELAY,
        };

        Ok(Config {
            addr,
            provider_base_url: lookup("PROVIDER_BASE_URL")
                .unwrap_or_else(|| ProviderClient::DEFAULT_BASE_URL.to_string()),
            user_agent: lookup("PROVIDER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            debounce_delay,
        })
    }

    pub fn provider(&self) -> Result<ProviderClient, ConfigError> {
        Ok(ProviderClient::new(&self.provider_base_url, &self.user_agent)?)
    }
}
