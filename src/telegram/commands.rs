//! /start and /help command handlers

use rand::Rng;
use serde_json::json;
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::core::config::admin::ADMIN_USER_ID;
use crate::telegram::handlers::{HandlerDeps, HandlerError};

/// The three fixed greeting variants for regular users.
pub fn greeting_variants(first_name: &str) -> [String; 3] {
    [
        format!("Hi {}! 😊", first_name),
        format!("Welcome {}! 😃", first_name),
        "Glad to see you here! 👍".to_string(),
    ]
}

/// Picks one of the three greeting variants at random.
pub fn pick_greeting(first_name: &str) -> String {
    let variants = greeting_variants(first_name);
    let idx = rand::thread_rng().gen_range(0..variants.len());
    variants[idx].clone()
}

/// Greeting for the operator identity.
pub fn operator_greeting(first_name: &str) -> String {
    format!("👑 Hello {}, good to see you again!", first_name)
}

/// Handle /start: greet, and auto-register first-contact non-operator users.
pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user = msg.from.as_ref();
    let user_id = user.and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);
    let first_name = user.map(|u| u.first_name.as_str()).unwrap_or("there");

    let message = if user_id == *ADMIN_USER_ID {
        operator_greeting(first_name)
    } else {
        match deps.allowlist.add(user_id).await {
            Ok(true) => log::info!("Auto-registered new user {} on /start", user_id),
            Ok(false) => {}
            Err(e) => log::error!("Failed to persist auto-registration of {}: {}", user_id, e),
        }
        pick_greeting(first_name)
    };

    // Remember the caller's profile language as an opaque preference.
    if let Some(lang) = user.and_then(|u| u.language_code.as_deref()) {
        if let Err(e) = deps.preferences.set(user_id, json!({ "language_code": lang })).await {
            log::warn!("Failed to persist preferences for {}: {}", user_id, e);
        }
    }

    bot.send_message(msg.chat.id, message).await?;
    Ok(())
}

/// Handle /help: usage text.
pub async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    let help_text = "📚 How to use this bot:\n\n\
        1️⃣ Send a TikTok link.\n\
        2️⃣ Pick what to download: video, audio, or images.\n\n\
        🎛 Commands:\n\
        /help - show this message.\n\
        /admin - manage allow-listed users (operator only).";

    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}
