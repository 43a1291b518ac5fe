// src/debounce.rs
use crate::error::CompareError;
use crate::models::ComparisonResult;
use crate::timeframe::Timeframe;
use log::debug;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonInput {
    #[serde(default)]
    pub ticker1: String,
    #[serde(default)]
    pub ticker2: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
}

fn default_timeframe() -> Timeframe {
    Timeframe::OneYear
}

impl ComparisonInput {
    pub fn is_complete(&self) -> bool {
        !self.ticker1.trim().is_empty() && !self.ticker2.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Pending,
    Fetching,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEvent {
    Loading,
    Ready { result: ComparisonResult },
    Failed { message: String },
    Cleared,
}

struct Shared {
    state: TriggerState,
    generation: u64,
    events: mpsc::UnboundedSender<TriggerEvent>,
}

impl Shared {
    fn publish(&self, event: TriggerEvent) {
        // A closed receiver means the session is gone.
        let _ = self.events.send(event);
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delays comparisons until input settles. Every call to [`update`] bumps a
/// generation counter; timers and fetches from older generations publish
/// nothing when they finish.
///
/// [`update`]: DebouncedTrigger::update
pub struct DebouncedTrigger<F> {
    delay: Duration,
    run: Arc<F>,
    shared: Arc<Mutex<Shared>>,
    timer: Option<JoinHandle<()>>,
}

impl<F, Fut> DebouncedTrigger<F>
where
    F: Fn(ComparisonInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ComparisonResult, CompareError>> + Send + 'static,
{
    pub fn new(delay: Duration, run: F) -> (Self, mpsc::UnboundedReceiver<TriggerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let trigger = Self {
            delay,
            run: Arc::new(run),
            shared: Arc::new(Mutex::new(Shared {
                state: TriggerState::Idle,
                generation: 0,
                events,
            })),
            timer: None,
        };
        (trigger, receiver)
    }

    pub fn state(&self) -> TriggerState {
        lock(&self.shared).state
    }

    pub fn update(&mut self, input: ComparisonInput) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            if !input.is_complete() {
                debug!("Input incomplete, clearing comparison");
                shared.state = TriggerState::Idle;
                shared.publish(TriggerEvent::Cleared);
                return;
            }
            shared.state = TriggerState::Pending;
            shared.generation
        };

        let delay = self.delay;
        let run = Arc::clone(&self.run);
        let shared = Arc::clone(&self.shared);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut guard = lock(&shared);
                if guard.generation != generation {
                    return;
                }
                guard.state = TriggerState::Fetching;
                guard.publish(TriggerEvent::Loading);
            }

            // Detached so aborting the next timer never cancels a fetch in flight.
            tokio::spawn(async move {
                let outcome = run(input).await;
                let mut guard = lock(&shared);
                if guard.generation != generation {
                    debug!("Discarding superseded comparison (generation {})", generation);
                    return;
                }
                guard.state = TriggerState::Idle;
                guard.publish(match outcome {
                    Ok(result) => TriggerEvent::Ready { result },
                    Err(e) => TriggerEvent::Failed {
                        message: e.to_string(),
                    },
                });
            });
        }));
    }
}

impl<F> Drop for DebouncedTrigger<F> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        lock(&self.shared).generation += 1;
    }
}
