//! Scheduled jobs and their registration on the scheduler.
//!
//! | job | trigger |
//! |---|---|
//! | `morning` | `MORNING_CRON` |
//! | `morning_startup` | once, one minute after start (`MORNING_ON_STARTUP`); shares `morning`'s guard |
//! | `evening_stats` | `EVENING_STATS_CRON` |
//! | `cleanup` | `CLEANUP_CRON` |
//! | `health_check` | every `HEALTH_CHECK_INTERVAL_MINS` |
//! | `export` | every `EXPORT_INTERVAL_HOURS` (`EXPORT_ENABLED`) |

mod evening;
mod export;
mod maintenance;
mod morning;

pub use evening::{evening_report, EveningStatsJob};
pub use export::{export_messages, render_csv, ExportJob, ExportOutcome};
pub use maintenance::{CleanupJob, HealthCheckJob};
pub use morning::{build_morning_report, MorningJob, MORNING_DEDUP_WINDOW, MORNING_SENT};

use anyhow::{Context, Result};
use mbot_core::Chat;
use scheduler::{JobSpec, Scheduler, Trigger};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::components::BotComponents;

pub const STARTUP_MORNING_DELAY: Duration = Duration::from_secs(60);

/// Sends `text` to the admin chat, if one is configured. Failures are only logged.
pub(crate) async fn notify_admin(components: &BotComponents, text: &str) {
    let Some(admin) = components.config.chats.admin_chat_id else {
        return;
    };
    if let Err(e) = components.bot.send_message(&Chat::with_id(admin), text).await {
        warn!(admin_chat_id = admin, error = %e, "Admin notification failed");
    }
}

/// Registers every configured job.
pub fn register_jobs(scheduler: &Scheduler, components: Arc<BotComponents>) -> Result<()> {
    let schedule = &components.config.schedule;
    let tz = schedule.timezone.name();
    let morning = Arc::new(MorningJob::new(components.clone()));

    scheduler
        .add_job(
            JobSpec::new("morning", Trigger::cron(&schedule.morning_cron, tz)?),
            morning.clone(),
        )
        .context("Failed to register morning job")?;
    if schedule.morning_on_startup {
        scheduler.add_job(
            JobSpec::new(
                "morning_startup",
                Trigger::Once {
                    after: STARTUP_MORNING_DELAY,
                },
            ),
            morning,
        )?;
    }
    scheduler.add_job(
        JobSpec::new(
            "evening_stats",
            Trigger::cron(&schedule.evening_stats_cron, tz)?,
        ),
        Arc::new(EveningStatsJob::new(components.clone())),
    )?;
    scheduler.add_job(
        JobSpec::new("cleanup", Trigger::cron(&schedule.cleanup_cron, tz)?),
        Arc::new(CleanupJob::new(
            components.repo.clone(),
            schedule.retention_days,
        )),
    )?;
    scheduler.add_job(
        JobSpec::new(
            "health_check",
            Trigger::Every(schedule.health_check_interval),
        ),
        Arc::new(HealthCheckJob::new(components.clone())),
    )?;
    if schedule.export_enabled {
        scheduler.add_job(
            JobSpec::new("export", Trigger::Every(schedule.export_interval)),
            Arc::new(ExportJob::new(components.clone())),
        )?;
    }

    info!(jobs = scheduler.snapshot().len(), "Scheduled jobs registered");
    Ok(())
}
