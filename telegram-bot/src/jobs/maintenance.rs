//! Housekeeping: purge of old message records and the database health check.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scheduler::Job;
use std::sync::Arc;
use storage::StatsRepository;
use tracing::{debug, info, instrument};

use super::notify_admin;
use crate::components::BotComponents;

pub struct CleanupJob {
    repo: Arc<StatsRepository>,
    retention_days: i64,
}

impl CleanupJob {
    pub fn new(repo: Arc<StatsRepository>, retention_days: i64) -> Self {
        Self {
            repo,
            retention_days,
        }
    }
}

#[async_trait]
impl Job for CleanupJob {
    #[instrument(skip(self), fields(job = "cleanup", days = self.retention_days))]
    async fn run(&self) -> Result<()> {
        let deleted = self
            .repo
            .cleanup_older_than(self.retention_days)
            .await
            .context("Failed to purge old messages")?;
        info!(deleted, "Old messages purged");
        Ok(())
    }
}

/// Pings the database; a failure is reported to the admin chat and to the scheduler.
pub struct HealthCheckJob {
    components: Arc<BotComponents>,
}

impl HealthCheckJob {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl Job for HealthCheckJob {
    async fn run(&self) -> Result<()> {
        if let Err(e) = self.components.repo.ping().await {
            notify_admin(
                &self.components,
                &format!("⚠️ База данных недоступна: {}", e),
            )
            .await;
            return Err(e).context("Database health check failed");
        }
        debug!("Database health check passed");
        Ok(())
    }
}
