use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::{config::Config, tick::TickOrchestrator};

/// Runs the tick orchestrator on a fixed interval inside a tokio task.
pub struct TickWorker {
    orchestrator: Arc<TickOrchestrator>,
    interval: Duration,
}

impl TickWorker {
    pub fn new(orchestrator: Arc<TickOrchestrator>, config: &Config) -> Self {
        Self {
            orchestrator,
            interval: Duration::from_secs(config.tick_interval_secs),
        }
    }

    /// Run the worker loop inside a tokio task. Overrunning ticks are not
    /// skipped; the next one starts as soon as the interval allows.
    pub fn run(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = self.interval.as_secs(), "Tick worker started");

            loop {
                ticker.tick().await;
                let started = Instant::now();

                match self.orchestrator.run_tick().await {
                    Ok(summary) => {
                        if summary.villages_failed > 0 || summary.events_failed > 0 {
                            warn!(
                                failed_villages = summary.villages_failed,
                                failed_events = summary.events_failed,
                                "Tick finished with failures"
                            );
                        }
                    }
                    Err(e) => error!(error = %e, "World tick failed"),
                }

                let elapsed = started.elapsed();
                if elapsed > self.interval {
                    warn!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        interval_ms = self.interval.as_millis() as u64,
                        "Tick overran its interval"
                    );
                }
            }
        });
    }
}
