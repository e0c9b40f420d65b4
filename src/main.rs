use anyhow::Result;
use dotenvy::dotenv;
use std::fs;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::time::interval;

use tikgrab::core::{config, init_logger};
use tikgrab::download::{deliver_artifact, download_media, ytdlp, DownloadQueue};
use tikgrab::storage::{AllowlistStore, PreferencesStore};
use tikgrab::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration,
/// missing external binaries, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    // Configuration errors are fatal at startup, never mid-session.
    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("TELOXIDE_TOKEN environment variable is not set");
    }
    ytdlp::ensure_ffmpeg_installed()?;
    ytdlp::log_ytdlp_version();

    fs::create_dir_all(config::downloads_dir())?;

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let allowlist = Arc::new(AllowlistStore::load(config::allowed_users_path()));
    let preferences = Arc::new(PreferencesStore::load(config::user_preferences_path()));
    let download_queue = Arc::new(DownloadQueue::new());

    // Start the download worker pool
    tokio::spawn(process_queue(bot.clone(), Arc::clone(&download_queue)));

    let deps = HandlerDeps {
        allowlist,
        preferences,
        download_queue,
    };

    log::info!("🚀 Starting bot...");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Drains the download queue with bounded concurrency.
///
/// An interval ticker pops tasks; each runs in its own spawned task gated by
/// a semaphore, so at most `MAX_CONCURRENT_DOWNLOADS` downloads are in
/// flight while further tasks wait in the queue. Download and delivery
/// failures both produce an explicit failure reply to the user.
async fn process_queue(bot: Bot, queue: Arc<DownloadQueue>) {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(config::queue::MAX_CONCURRENT_DOWNLOADS));
    let mut interval = interval(config::queue::check_interval());

    loop {
        interval.tick().await;
        if let Some(task) = queue.get_task().await {
            let bot = bot.clone();
            let queue = Arc::clone(&queue);
            let semaphore = Arc::clone(&semaphore);

            tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        log::error!("Failed to acquire download permit for task {}: {}", task.id, e);
                        queue.remove_active(&task).await;
                        return;
                    }
                };
                log::info!("Processing task {} ({:?} {})", task.id, task.kind, task.url);

                match download_media(&task).await {
                    Ok(artifact) => {
                        if let Err(e) = deliver_artifact(&bot, task.chat_id, &artifact).await {
                            log::error!("Failed to send artifact for task {}: {}", task.id, e);
                            let _ = bot
                                .send_message(task.chat_id, "❌ I couldn't send the file. Please try again.")
                                .await;
                        } else {
                            log::info!("Task {} delivered to chat {}", task.id, task.chat_id);
                        }
                    }
                    Err(e) => {
                        log::error!("Download failed for task {} ({}): {}", task.id, task.url, e);
                        let _ = bot
                            .send_message(task.chat_id, "❌ Download failed. Please try again later.")
                            .await;
                    }
                }

                queue.remove_active(&task).await;
            });
        }
    }
}
