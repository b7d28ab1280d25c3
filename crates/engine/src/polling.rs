//! Auto-refresh timer driving periodic fetch cycles.

use std::sync::Arc;
use std::time::Duration;

use resttable_types::{EndpointConfig, RefreshInterval};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::fetch::FetchController;

/// Longest period handed to the timer. Larger intervals are valid settings
/// but would overflow `Instant`; at this length they never tick in practice.
const MAX_TIMER_PERIOD: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingState {
    Off,
    Active(RefreshInterval),
}

/// Owns at most one polling timer for a [`FetchController`].
///
/// Every change (interval, configuration, stop, drop) cancels the running
/// timer before anything else happens. Cancelling only stops future ticks:
/// each tick runs its fetch as a separate task, so a request already on the
/// wire completes and updates the result normally.
///
/// Methods that start a timer must be called from inside a Tokio runtime.
pub struct PollingScheduler {
    controller: Arc<FetchController>,
    config: EndpointConfig,
    interval: RefreshInterval,
    timer: Option<JoinHandle<()>>,
}

impl PollingScheduler {
    /// A stopped scheduler for `config`.
    pub fn new(controller: Arc<FetchController>, config: EndpointConfig) -> Self {
        Self {
            controller,
            config,
            interval: RefreshInterval::OFF,
            timer: None,
        }
    }

    pub fn state(&self) -> PollingState {
        match self.timer {
            Some(_) => PollingState::Active(self.interval),
            None => PollingState::Off,
        }
    }

    pub fn interval(&self) -> RefreshInterval {
        self.interval
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Whether a timer task exists and has not finished or been cancelled.
    pub fn is_timer_live(&self) -> bool {
        self.timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Replace the cadence. The first tick of the new timer happens one full
    /// period from now; `RefreshInterval::OFF` leaves the scheduler stopped.
    pub fn set_interval(&mut self, interval: RefreshInterval) {
        self.cancel_timer();
        self.interval = interval;
        self.start_timer();
    }

    /// Poll a different endpoint at the current cadence.
    pub fn set_config(&mut self, config: EndpointConfig) {
        self.cancel_timer();
        self.config = config;
        self.start_timer();
    }

    pub fn stop(&mut self) {
        self.cancel_timer();
        self.interval = RefreshInterval::OFF;
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
            debug!(interval = %self.interval, "polling timer cancelled");
        }
    }

    fn start_timer(&mut self) {
        let Some(period) = self.interval.period() else {
            return;
        };
        let period = period.min(MAX_TIMER_PERIOD);

        let controller = Arc::clone(&self.controller);
        let config = self.config.clone();
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!("polling tick");
                let controller = Arc::clone(&controller);
                let config = config.clone();
                tokio::spawn(async move {
                    // The controller records the failure in the shared result.
                    let _ = controller.fetch(&config).await;
                });
            }
        }));
        debug!(interval = %self.interval, "polling timer started");
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
