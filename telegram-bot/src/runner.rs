//! Process entry points: the long-running bot and the one-off export.

use anyhow::Result;
use chrono::Utc;
use mbot_core::{init_tracing, Bot};
use mbot_telegram::{run_repl, TelegramBotAdapter};
use scheduler::{Scheduler, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use storage::StatsRepository;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::cli::export_since;
use crate::components::{build_bot_components, build_dispatcher};
use crate::config::BotConfig;
use crate::jobs::{export_messages, notify_admin, register_jobs, ExportOutcome};
use crate::VERSION;

/// Validates config, starts logging, the scheduler and the receive loop. Returns after Ctrl-C.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        version = VERSION,
        database_url = %config.database_url(),
        target_chat_id = config.chats.target_chat_id,
        "Initializing bot"
    );

    let config = Arc::new(config);
    let teloxide_bot = config.base.telegram.build_bot()?;
    let outgoing: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let components = Arc::new(build_bot_components(config.clone(), outgoing.clone()).await?);
    let dispatcher = Arc::new(build_dispatcher(&components));

    let scheduler = Arc::new(Scheduler::new(Arc::new(SystemClock)));
    register_jobs(&scheduler, components.clone())?;
    let cancel = CancellationToken::new();
    let scheduler_task = {
        let scheduler = scheduler.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { scheduler.run(cancel).await })
    };

    notify_admin(&components, &format!("🚀 Бот запущен, версия {}", VERSION)).await;
    info!("Bot started successfully");

    let result = run_repl(
        teloxide_bot,
        dispatcher,
        outgoing,
        components.bot_username.clone(),
    )
    .await;

    cancel.cancel();
    if let Err(e) = scheduler_task.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }
    info!("Bot stopped");
    result
}

/// `mbot export`: writes stored history of the last `hours` (all of it when `None`) to CSV.
#[instrument(skip(config))]
pub async fn run_export(
    config: BotConfig,
    hours: Option<u64>,
    dir: Option<PathBuf>,
) -> Result<Option<ExportOutcome>> {
    init_tracing(config.log_file())?;
    let repo = StatsRepository::new(config.database_url()).await?;

    let now = Utc::now();
    let since = export_since(hours, now)?;
    let dir = dir.unwrap_or_else(|| config.schedule.export_dir.clone());
    export_messages(&repo, &dir, since, now).await
}
