//! Bot initialization and the command surface

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "greet you and register your account")]
    Start,
    #[command(description = "show how to use the bot")]
    Help,
    #[command(description = "manage allow-listed users (operator only)")]
    Admin,
}

/// Creates a Bot instance with a long-timeout HTTP client.
///
/// The generous timeout accommodates large video uploads; the default
/// reqwest client gives up long before a 50 MB send completes.
pub fn create_bot() -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config::BOT_TOKEN.clone(), client))
}

/// Sets up bot commands in the Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "greet and register"),
        BotCommand::new("help", "show how to use the bot"),
        BotCommand::new("admin", "manage allow-listed users (operator only)"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let descriptions = format!("{}", Command::descriptions());
        assert!(descriptions.contains("start"));
        assert!(descriptions.contains("help"));
        assert!(descriptions.contains("admin"));
    }
}
