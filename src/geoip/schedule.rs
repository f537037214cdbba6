//! Recurring database refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::request::ErrorLatch;

use super::database::{DatabaseManager, RefreshMode};

/// Spawns a task that refreshes the database every `period`.
///
/// The first refresh runs one full period after start. Each run gets a fresh
/// error latch, so a scheduled run can record one error of its own. The next
/// run time is published through [`DatabaseManager::state`].
pub fn spawn_refresh_job(manager: Arc<DatabaseManager>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            manager.set_next_scheduled_refresh(next_run(period));
            ticker.tick().await;

            log::info!("Running scheduled location database refresh");
            let mut latch = ErrorLatch::new();
            if manager
                .ensure_available(&mut latch, RefreshMode::Scheduled)
                .await
            {
                log::info!("Scheduled refresh complete");
            } else {
                log::warn!("Scheduled refresh did not produce a usable database");
            }
        }
    })
}

fn next_run(period: Duration) -> Option<chrono::DateTime<Utc>> {
    chrono::Duration::from_std(period)
        .ok()
        .and_then(|period| Utc::now().checked_add_signed(period))
}
