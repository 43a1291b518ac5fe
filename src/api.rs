// src/api.rs
use crate::compare::{clean_ticker, compare};
use crate::debounce::{ComparisonInput, DebouncedTrigger};
use crate::error::{handle_rejection, ApiError};
use crate::format::{summarize, ComparisonSummary};
use crate::models::ComparisonResult;
use crate::provider::ProviderClient;
use crate::timeframe::{resolve_start, Timeframe};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warp::ws::{Message, WebSocket, Ws};
use warp::{Filter, Rejection, Reply};

#[derive(Deserialize)]
struct StockQuery {
    symbol: Option<String>,
    timeframe: Option<String>,
}

#[derive(Deserialize)]
struct CompareQuery {
    ticker1: Option<String>,
    ticker2: Option<String>,
    timeframe: Option<String>,
}

/// Reply to a frame that is not a valid input. The trigger is left as it
/// was, so a comparison already pending still reports.
#[derive(Serialize)]
#[serde(tag = "type", rename = "invalid")]
struct InvalidFrame {
    message: String,
}

#[derive(Serialize)]
struct ComparisonReport {
    #[serde(flatten)]
    result: ComparisonResult,
    summary: ComparisonSummary,
}

pub fn routes(
    provider: Arc<ProviderClient>,
    debounce_delay: Duration,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let stock = warp::path!("api" / "stock")
        .and(warp::get())
        .and(warp::query::<StockQuery>())
        .and(with_provider(provider.clone()))
        .and_then(stock_handler);

    let compare = warp::path!("api" / "compare")
        .and(warp::get())
        .and(warp::query::<CompareQuery>())
        .and(with_provider(provider.clone()))
        .and_then(compare_handler);

    let live = warp::path!("api" / "live")
        .and(warp::ws())
        .and(with_provider(provider))
        .and(with_delay(debounce_delay))
        .map(|ws: Ws, provider: Arc<ProviderClient>, delay: Duration| {
            ws.on_upgrade(move |socket| live_session(socket, provider, delay))
        });

    stock
        .or(compare)
        .or(live)
        .recover(handle_rejection)
        .with(warp::log("stock_compare::api"))
}

fn with_provider(
    provider: Arc<ProviderClient>,
) -> impl Filter<Extract = (Arc<ProviderClient>,), Error = Infallible> + Clone {
    warp::any().map(move || provider.clone())
}

fn with_delay(delay: Duration) -> impl Filter<Extract = (Duration,), Error = Infallible> + Clone {
    warp::any().map(move || delay)
}

fn required(value: Option<String>, name: &'static str) -> Result<String, Rejection> {
    value
        .map(|v| clean_ticker(&v))
        .filter(|v| !v.is_empty())
        .ok_or_else(|| warp::reject::custom(ApiError::MissingParameter(name)))
}

async fn stock_handler(
    query: StockQuery,
    provider: Arc<ProviderClient>,
) -> Result<impl Reply, Rejection> {
    let symbol = required(query.symbol, "symbol")?;
    let timeframe = query.timeframe.as_deref().unwrap_or("2y");
    let end = Utc::now().date_naive();
    let start = resolve_start(end, timeframe);

    match provider.fetch_history(&symbol, start, end).await {
        Ok(history) if history.prices.is_empty() => {
            warn!("No price data for {} over {}", symbol, timeframe);
            Err(warp::reject::custom(ApiError::NotFound(symbol)))
        }
        Ok(history) => {
            info!(
                "Serving {} prices for {} over {}",
                history.prices.len(),
                symbol,
                timeframe
            );
            Ok(warp::reply::json(&history))
        }
        Err(e) if e.is_not_found() => {
            warn!("Unknown symbol {}: {}", symbol, e);
            Err(warp::reject::custom(ApiError::NotFound(symbol)))
        }
        Err(e) => {
            error!("Failed to fetch stock data for {}: {}", symbol, e);
            Err(warp::reject::custom(ApiError::Internal))
        }
    }
}

async fn compare_handler(
    query: CompareQuery,
    provider: Arc<ProviderClient>,
) -> Result<impl Reply, Rejection> {
    let ticker1 = required(query.ticker1, "ticker1")?;
    let ticker2 = required(query.ticker2, "ticker2")?;
    let timeframe = Timeframe::parse(query.timeframe.as_deref().unwrap_or("1y"));

    match compare(&provider, &ticker1, &ticker2, timeframe, Utc::now().date_naive()).await {
        Ok(result) => {
            let summary = summarize(&result);
            Ok(warp::reply::json(&ComparisonReport { result, summary }))
        }
        Err(e) => {
            error!("Comparison of {} and {} failed: {}", ticker1, ticker2, e);
            Err(warp::reject::custom(ApiError::Compare(e)))
        }
    }
}

/// Websocket session: each text frame is a new input for the debounced
/// trigger; trigger events are written back as JSON.
async fn live_session(socket: WebSocket, provider: Arc<ProviderClient>, delay: Duration) {
    let (mut sink, mut stream) = socket.split();
    let (mut trigger, mut events) = DebouncedTrigger::new(delay, move |input: ComparisonInput| {
        let provider = provider.clone();
        async move {
            compare(
                &provider,
                &input.ticker1,
                &input.ticker2,
                input.timeframe,
                Utc::now().date_naive(),
            )
            .await
        }
    });
    info!("Live comparison session opened");

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(message)) if message.is_close() => break,
                Some(Ok(message)) => {
                    let Ok(text) = message.to_str() else { continue };
                    match serde_json::from_str::<ComparisonInput>(text) {
                        Ok(input) => {
                            debug!("Live input {:?} (trigger {:?})", input, trigger.state());
                            trigger.update(input);
                        }
                        Err(e) => {
                            debug!("Ignoring malformed live frame: {}", e);
                            let reply = InvalidFrame {
                                message: format!("Invalid request: {}", e),
                            };
                            if send_event(&mut sink, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("Live session receive failed: {}", e);
                    break;
                }
                None => break,
            },
            Some(event) = events.recv() => {
                if send_event(&mut sink, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    info!("Live comparison session closed");
}

async fn send_event<S, T>(sink: &mut S, event: &T) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = warp::Error> + Unpin,
    T: Serialize,
{
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize live event: {}", e);
            return Err(());
        }
    };
    sink.send(Message::text(payload)).await.map_err(|e| {
        warn!("Live session send failed: {}", e);
    })
}
