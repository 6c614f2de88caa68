//! Periodic maintenance worker driving the orphan sweep.

use crate::recurrence::ports::{ActivityLog, TaskStore};
use crate::recurrence::services::{DispatchError, LifecycleFacade, MaintenanceReport};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Default spacing between maintenance passes.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Maintenance loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceConfig {
    interval: Duration,
}

impl MaintenanceConfig {
    /// Creates a configuration with the default hourly interval.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Sets the spacing between passes.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the spacing between passes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the facade's maintenance entry point on an interval until told to
/// shut down.
///
/// A failed pass is logged and never kills the loop; the next tick simply
/// tries again, which is safe because the sweep is idempotent.
#[derive(Debug, Clone)]
pub struct MaintenanceWorker<S, A, C>
where
    S: TaskStore,
    A: ActivityLog,
    C: Clock + Send + Sync,
{
    facade: Arc<LifecycleFacade<S, A, C>>,
    config: MaintenanceConfig,
}

impl<S, A, C> MaintenanceWorker<S, A, C>
where
    S: TaskStore,
    A: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a worker over the given facade.
    #[must_use]
    pub const fn new(facade: Arc<LifecycleFacade<S, A, C>>, config: MaintenanceConfig) -> Self {
        Self { facade, config }
    }

    /// Runs a single maintenance pass.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Maintenance`] when the sweep fails.
    pub async fn run_once(&self) -> Result<MaintenanceReport, DispatchError> {
        self.facade.maintenance().await
    }

    /// Runs passes on the configured interval until the shutdown signal
    /// flips to `true` or its sender is dropped.
    pub async fn run_until_shutdown(&self, mut shutdown: watch::Receiver<bool>) {
        if *shutdown.borrow() {
            return;
        }
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately; consume it
        // so the first sweep happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await.map_or_else(
                        |err| warn!(error = %err, "maintenance pass failed"),
                        |report| debug!(
                            orphans_removed = report.orphans_removed,
                            "maintenance pass completed"
                        ),
                    );
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }
}
