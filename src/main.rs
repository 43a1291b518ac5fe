// src/main.rs
mod api;
mod compare;
mod config;
mod debounce;
mod error;
mod format;
mod models;
mod normalize;
mod provider;
mod timeframe;

#[cfg(test)]
mod testing;

use crate::config::Config;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    let provider = match config.provider() {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("Failed to initialize provider client: {}", e);
            return;
        }
    };
    info!(
        "Using provider {} with a {}ms debounce",
        config.provider_base_url,
        config.debounce_delay.as_millis()
    );

    info!("Starting the stock comparison service...");
    let api = api::routes(provider, config.debounce_delay);

    info!("Server running on http://{}", config.addr);
    warp::serve(api).run(config.addr).await;
}
