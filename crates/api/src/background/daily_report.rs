//! Daily progress report job.
//!
//! Once a day (first tick at startup), logs per-project sprint progress so
//! operators get a durable trace of completion trends without querying the
//! API. Purely observational: no rows are written.

use std::time::Duration;

use sqlx::PgPool;
use stride_db::repositories::{ProjectRepo, SummaryRepo};
use tokio_util::sync::CancellationToken;

/// How often the report runs.
const REPORT_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Run the daily report loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = REPORT_INTERVAL.as_secs(),
        "Daily report job started"
    );

    let mut interval = tokio::time::interval(REPORT_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Daily report job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = report(&pool).await {
                    tracing::error!(error = %e, "Daily report failed");
                }
            }
        }
    }
}

/// Produce one report pass over every project.
async fn report(pool: &PgPool) -> Result<(), sqlx::Error> {
    let projects = ProjectRepo::list(pool).await?;

    for project in &projects {
        let progress = SummaryRepo::sprint_progress(pool, project.id).await?;
        for sprint in &progress {
            tracing::info!(
                project_id = project.id,
                project = %project.title,
                sprint_id = sprint.sprint_id,
                sprint = %sprint.title,
                total = sprint.total,
                completed = sprint.completed,
                active = sprint.active,
                blocked = sprint.blocked,
                "Sprint progress"
            );
        }
    }

    if !projects.is_empty() {
        tracing::info!(projects = projects.len(), "Daily report complete");
    }

    Ok(())
}
