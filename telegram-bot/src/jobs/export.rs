//! CSV export of stored message history into a local folder.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use scheduler::Job;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{MessageRecord, StatsRepository};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::notify_admin;
use crate::components::BotComponents;

pub const CSV_HEADER: [&str; 5] = ["chat_id", "user_id", "timestamp", "text", "reply"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
}

/// One row per record: `chat_id,user_id,timestamp,text,reply` with an RFC 3339 timestamp.
pub fn render_csv(records: &[MessageRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for r in records {
        wtr.write_record([
            r.chat_id.to_string(),
            r.user_id.to_string(),
            r.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            r.text.clone(),
            r.reply.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV: {}", e))
}

/// Writes records created since `since` to `dir/chat_history_<YYYYMMDD_HHMMSS>.csv`.
/// Nothing is written when there are no records.
#[instrument(skip(repo, dir), fields(dir = %dir.display()))]
pub async fn export_messages(
    repo: &StatsRepository,
    dir: &Path,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Option<ExportOutcome>> {
    let records = repo
        .messages_since(since)
        .await
        .context("Failed to load messages for export")?;
    if records.is_empty() {
        info!("Nothing to export");
        return Ok(None);
    }

    let body = render_csv(&records)?;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
    let path = dir.join(format!(
        "chat_history_{}.csv",
        now.format("%Y%m%d_%H%M%S")
    ));
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(rows = records.len(), path = %path.display(), "History exported");
    Ok(Some(ExportOutcome {
        path,
        rows: records.len(),
    }))
}

/// Exports what arrived since the last successful export and tells the admin chat.
///
/// The first run covers one export interval. The cursor only moves after a successful run, so
/// records from a failed or skipped run are picked up by the next one.
pub struct ExportJob {
    components: Arc<BotComponents>,
    last_export: Mutex<Option<DateTime<Utc>>>,
}

impl ExportJob {
    pub fn new(components: Arc<BotComponents>) -> Self {
        Self {
            components,
            last_export: Mutex::new(None),
        }
    }

    /// Runs one export as of `now`.
    pub async fn export_at(&self, now: DateTime<Utc>) -> Result<Option<ExportOutcome>> {
        let c = &self.components;
        let schedule = &c.config.schedule;
        let mut last_export = self.last_export.lock().await;
        let since = match *last_export {
            Some(at) => at,
            None => {
                let interval = Duration::from_std(schedule.export_interval)
                    .context("Export interval out of range")?;
                now - interval
            }
        };
        // Pin the window start so a failure below is retried from the same point.
        *last_export = Some(since);

        let outcome = export_messages(&c.repo, &schedule.export_dir, since, now).await?;
        *last_export = Some(now);

        if let Some(outcome) = &outcome {
            notify_admin(
                c,
                &format!(
                    "📁 Экспорт истории: {} сообщений, файл {}",
                    outcome.rows,
                    outcome.path.display()
                ),
            )
            .await;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl Job for ExportJob {
    #[instrument(skip(self), fields(job = "export"))]
    async fn run(&self) -> Result<()> {
        self.export_at(Utc::now()).await.map(|_| ())
    }
}
