//! Dispatcher schema and the link / callback flows
//!
//! The same schema is used in production and can be reused in integration
//! tests. Three branches, checked in order: bot commands, plain text
//! messages (candidate links), and callback queries (download choices).

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Message};
use url::Url;

use crate::core::config::admin::ADMIN_USER_ID;
use crate::download::metadata::{classify, is_tiktok_url, MediaKind};
use crate::download::queue::{DownloadKind, DownloadQueue, DownloadTask};
use crate::storage::{AllowlistStore, PreferencesStore};
use crate::telegram::admin::handle_admin_command;
use crate::telegram::bot::Command;
use crate::telegram::commands::{handle_help_command, handle_start_command};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub allowlist: Arc<AllowlistStore>,
    pub preferences: Arc<PreferencesStore>,
    pub download_queue: Arc<DownloadQueue>,
}

/// Creates the main dispatcher schema for the bot.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Returns true if `user_id` may use the download flow.
async fn is_authorized(user_id: i64, deps: &HandlerDeps) -> bool {
    user_id == *ADMIN_USER_ID || deps.allowlist.contains(user_id).await
}

/// Builds the choice keyboard for a classified link. `None` means there is
/// nothing to offer (undetermined media).
pub fn choice_keyboard(kind: MediaKind, url: &str) -> Option<InlineKeyboardMarkup> {
    let row = match kind {
        MediaKind::Video => vec![
            InlineKeyboardButton::callback("Video HD", format!("video_hd|{}", url)),
            InlineKeyboardButton::callback("Audio (MP3)", format!("audio|{}", url)),
        ],
        MediaKind::Image => vec![InlineKeyboardButton::callback(
            "Download images",
            format!("image|{}", url),
        )],
        MediaKind::Undetermined => return None,
    };
    Some(InlineKeyboardMarkup::new(vec![row]))
}

/// Decodes a `choice|url` callback token into a download request.
pub fn parse_callback_token(data: &str) -> Option<(DownloadKind, Url)> {
    let (choice, url) = data.split_once('|')?;
    let kind = DownloadKind::from_token(choice)?;
    let url = Url::parse(url).ok()?;
    Some((kind, url))
}

/// Handler for bot commands (/start, /help, /admin)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await?,
                    Command::Help => handle_help_command(&bot, &msg).await?,
                    Command::Admin => {
                        let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);
                        let message_text = msg.text().unwrap_or_default();
                        handle_admin_command(&bot, msg.chat.id, user_id, message_text, &deps.allowlist).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for plain text messages, treated as candidate links
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_link_message(&bot, &msg, &deps).await {
                    log::error!("Error handling message from chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// The link flow: authorize, admit, classify, offer choices.
async fn handle_link_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);
    if !is_authorized(user_id, deps).await {
        bot.send_message(msg.chat.id, "❌ Access denied.").await?;
        return Ok(());
    }

    let text = msg.text().unwrap_or_default().trim();
    if !is_tiktok_url(text) {
        bot.send_message(msg.chat.id, "❌ That is not a valid TikTok link.").await?;
        return Ok(());
    }

    // The admission pattern accepts scheme-less links; Url::parse does not.
    let with_scheme = if text.starts_with("http://") || text.starts_with("https://") {
        text.to_string()
    } else {
        format!("https://{}", text)
    };
    let url = match Url::parse(&with_scheme) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Admitted link failed to parse ({}): {}", text, e);
            bot.send_message(msg.chat.id, "❌ That is not a valid TikTok link.").await?;
            return Ok(());
        }
    };

    let kind = classify(&url).await;
    match choice_keyboard(kind, url.as_str()) {
        Some(keyboard) => {
            bot.send_message(msg.chat.id, "🎥 What do you want to download?")
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "❌ Couldn't detect the media type for that link.")
                .await?;
        }
    }
    Ok(())
}

/// Handler for callback queries (the download choice buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // Stop the button spinner regardless of what happens next.
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query: {}", e);
            }

            let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
                return Ok(());
            };
            let message_id = q.message.as_ref().map(|m| m.id());
            let Some(data) = q.data.as_deref() else {
                return Ok(());
            };

            match parse_callback_token(data) {
                Some((kind, url)) => {
                    let task = DownloadTask::new(url, chat_id, kind);
                    if deps.download_queue.add_task(task).await {
                        // Replace the choice buttons with a progress note.
                        if let Some(message_id) = message_id {
                            let _ = bot.edit_message_text(chat_id, message_id, "⏳ Downloading...").await;
                        }
                    } else {
                        bot.send_message(chat_id, "⚠️ That download is already in progress.")
                            .await?;
                    }
                }
                None => {
                    log::warn!("Invalid callback data from chat {}: {:?}", chat_id, data);
                    if let Some(message_id) = message_id {
                        bot.edit_message_text(chat_id, message_id, "❌ Invalid callback data.")
                            .await?;
                    } else {
                        bot.send_message(chat_id, "❌ Invalid callback data.").await?;
                    }
                }
            }
            Ok(())
        }
    })
}
