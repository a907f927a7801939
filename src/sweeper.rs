//! Background auction expiry sweeper
//!
//! Drives [`MarketService::sweep_expired_auctions`] on a fixed cadence so
//! auctions settle without any buyer or seller action. The sweep itself is
//! synchronous storage work, so each tick runs it on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::offer::TimeStamp;
use crate::service::MarketService;

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between sweep passes.
    pub period: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
        }
    }
}

/// Run sweep passes until the shutdown flag flips to `true` or the sender
/// side is dropped. Individual pass failures are logged, never fatal.
pub async fn run_sweeper(
    service: Arc<MarketService>,
    config: SweeperConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(period_secs = config.period.as_secs(), "auction sweeper started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let service = service.clone();
                let pass = tokio::task::spawn_blocking(move || {
                    service.sweep_expired_auctions(TimeStamp::new())
                })
                .await;

                match pass {
                    Ok(Ok(settled)) if settled.is_empty() => {
                        debug!("sweep pass found nothing to settle");
                    }
                    Ok(Ok(settled)) => {
                        info!(settled = settled.len(), "sweep pass settled auctions");
                    }
                    Ok(Err(e)) => error!(error = %e, "sweep pass failed"),
                    Err(e) => error!(error = %e, "sweep task panicked"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow_and_update() {
                    info!("auction sweeper stopping");
                    return;
                }
            }
        }
    }
}
