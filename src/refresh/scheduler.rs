use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use utoipa::ToSchema;

use super::error::RefreshError;
use super::FeedSource;
use crate::clock::Clock;
use crate::oem::{format_epoch, parse_oem};
use crate::series::{SeriesStore, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Fetching,
    Parsing,
    Replacing,
    /// The last cycle failed; the previous series is still being served.
    Failed,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshStatus {
    pub state: RefreshState,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    /// Number of vectors installed by the last successful cycle.
    pub vectors: usize,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Completed { vectors: usize },
    /// Another cycle was already in flight.
    Skipped,
    Failed { message: String },
}

/// Fetch → parse → replace cycle, at most one in flight at a time.
pub struct Refresher {
    source: Arc<dyn FeedSource>,
    url: String,
    store: Arc<SeriesStore>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
    status: StdMutex<RefreshStatus>,
}

/// Clears the in-flight flag however the cycle ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Refresher {
    pub fn new(
        source: Arc<dyn FeedSource>,
        url: String,
        store: Arc<SeriesStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            url,
            store,
            clock,
            in_flight: AtomicBool::new(false),
            status: StdMutex::new(RefreshStatus {
                state: RefreshState::Idle,
                last_attempt: None,
                last_success: None,
                vectors: 0,
                last_error: None,
            }),
        }
    }

    pub fn status(&self) -> RefreshStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one cycle now, or do nothing if one is already running.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Refresh already in progress, trigger coalesced");
            return RefreshOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.in_flight);

        self.update(|status| status.last_attempt = Some(self.clock.now()));
        log::info!("Refreshing ephemeris from {}", self.url);

        match self.run_cycle().await {
            Ok(vectors) => {
                let now = self.clock.now();
                self.update(|status| {
                    status.state = RefreshState::Idle;
                    status.last_success = Some(now);
                    status.vectors = vectors;
                    status.last_error = None;
                });
                RefreshOutcome::Completed { vectors }
            }
            Err(e) => {
                log::error!(
                    "Refresh failed, keeping {} previously loaded vectors: {}",
                    self.store.snapshot().len(),
                    e
                );
                let message = e.to_string();
                self.update(|status| {
                    status.state = RefreshState::Failed;
                    status.last_error = Some(message.clone());
                });
                RefreshOutcome::Failed { message }
            }
        }
    }

    async fn run_cycle(&self) -> Result<usize, RefreshError> {
        self.set_state(RefreshState::Fetching);
        let raw = self.source.fetch(&self.url).await?;

        self.set_state(RefreshState::Parsing);
        let series = TimeSeries::new(parse_oem(&raw)?);
        let count = series.len();
        match (series.first(), series.last()) {
            (Some(first), Some(last)) => log::info!(
                "Parsed {} state vectors spanning {} to {}",
                count,
                format_epoch(&first.epoch),
                format_epoch(&last.epoch)
            ),
            _ => log::warn!("Feed parsed but contains no state vectors"),
        }

        self.set_state(RefreshState::Replacing);
        self.store.replace(series).await;
        Ok(count)
    }

    /// Spawn the periodic loop. The first cycle runs immediately.
    pub fn start(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        log::info!("Starting ephemeris refresh (interval: {:?})", every);

        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let RefreshOutcome::Completed { vectors } = self.refresh().await {
                    log::info!("Scheduled refresh completed: {} vectors", vectors);
                }
            }
        })
    }

    fn set_state(&self, state: RefreshState) {
        log::debug!("Refresh state -> {}", state);
        self.update(|status| status.state = state);
    }

    fn update(&self, f: impl FnOnce(&mut RefreshStatus)) {
        f(&mut self.status.lock().unwrap_or_else(PoisonError::into_inner));
    }
}
