//! Scheduled overdue sweep.
//!
//! Spawns a loop that transitions every task past its deadline into
//! `overdue`, appending the matching history rows in the same transaction
//! (see `TaskRepo::sweep_overdue`). The interval's first tick fires
//! immediately, so one sweep always runs at process start; after that the
//! sweep runs once a day. Deadlines are compared in UTC.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use stride_db::repositories::TaskRepo;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs after the eager startup pass.
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Run the overdue sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Overdue sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match TaskRepo::sweep_overdue(&pool, Utc::now()).await {
                    Ok(swept) => {
                        if swept.is_empty() {
                            tracing::debug!("Overdue sweep: no tasks past deadline");
                        } else {
                            tracing::info!(
                                count = swept.len(),
                                task_ids = ?swept,
                                "Overdue sweep: tasks transitioned"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Overdue sweep failed, nothing was changed");
                    }
                }
            }
        }
    }
}
