//! Background jobs run on a fixed interval alongside the server.
mod retitle_sessions;

pub use retitle_sessions::RetitleSessions;

use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    /// Run one pass. Jobs log their own failures, nothing is retried
    /// until the next tick.
    async fn run_job(&self, config: &AppConfig, db: &Connection);
}

/// Spawn `job` in its own tokio task, running it every
/// `job.interval()`. The first run happens after one full interval.
pub fn spawn_periodic_job<J: PeriodicJob>(config: AppConfig, db: Connection, job: J) {
    tokio::spawn(async move {
        let period = job.interval();
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            job.run_job(&config, &db).await;
        }
    });
}
