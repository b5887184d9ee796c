use anyhow::Result;

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::core::logging::init_logging;
use crate::jobs::{PeriodicJob, RetitleSessions};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum JobId {
    RetitleSessions,
}

pub async fn run(id: JobId, config: AppConfig) -> Result<()> {
    init_logging();

    let db = async_db(&config.db_path).await?;

    let job: Box<dyn PeriodicJob> = match id {
        JobId::RetitleSessions => Box::new(RetitleSessions),
    };

    println!("Running job: {:?}", id);
    job.run_job(&config, &db).await;
    println!("Job completed");

    Ok(())
}
