//! Background discovery loop

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Scan periodically until Ctrl-C, then persist the registry
pub async fn run(state: Arc<AppState>) -> Result<()> {
    run_until(state, tokio::signal::ctrl_c()).await
}

/// Scan periodically until `shutdown` resolves, then persist the registry
async fn run_until<F>(state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(shutdown);

    info!("Running initial bridge discovery");
    tokio::select! {
        _ = state.scan() => {}
        result = &mut shutdown => {
            result?;
            info!("Shutting down");
            return state.save().await;
        }
    }

    let period = state.config.daemon.scan_interval_secs;
    if period == 0 {
        info!("Periodic scans disabled, waiting for shutdown");
        (&mut shutdown).await?;
    } else {
        let mut ticker = interval(Duration::from_secs(period));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately and the initial scan already ran
        ticker.tick().await;

        info!(interval_secs = period, "Discovery scheduler started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Running scheduled discovery");
                    // Shutdown stays live while a scan is in flight
                    tokio::select! {
                        summary = state.scan() => {
                            if summary.changed() {
                                save_or_warn(&state).await;
                            }
                        }
                        result = &mut shutdown => {
                            result?;
                            break;
                        }
                    }
                }
                result = &mut shutdown => {
                    result?;
                    break;
                }
            }
        }
    }

    info!("Shutting down");
    state.save().await
}

/// Save between scans; a failure is logged and the loop keeps running
async fn save_or_warn(state: &AppState) -> bool {
    match state.save().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Periodic save failed");
            false
        }
    }
}
