//! Operator-only allow-list console
//!
//! `/admin` with no arguments lists the allow-listed IDs with inline usage
//! help; `add <id>` and `remove <id>` mutate the store. Everyone but the
//! operator gets an access-denied reply.

use teloxide::prelude::*;

use crate::core::config::admin::ADMIN_USER_ID;
use crate::storage::AllowlistStore;
use crate::telegram::handlers::HandlerError;

/// Check if the caller is the operator identity
pub fn is_operator(user_id: i64) -> bool {
    user_id == *ADMIN_USER_ID
}

/// A parsed /admin invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// No arguments: list the allow-list plus usage help
    List,
    /// `add <id>`
    Add(i64),
    /// `remove <id>`
    Remove(i64),
    /// `add`/`remove` with a non-integer argument
    InvalidId,
    /// Unknown sub-command or wrong argument count
    InvalidCommand,
}

impl AdminAction {
    /// Parses the whitespace-separated arguments after the command name.
    pub fn parse(args: &str) -> Self {
        let parts: Vec<&str> = args.split_whitespace().collect();
        match parts.as_slice() {
            [] => AdminAction::List,
            [sub, id] if sub.eq_ignore_ascii_case("add") => {
                id.parse::<i64>().map(AdminAction::Add).unwrap_or(AdminAction::InvalidId)
            }
            [sub, id] if sub.eq_ignore_ascii_case("remove") => id
                .parse::<i64>()
                .map(AdminAction::Remove)
                .unwrap_or(AdminAction::InvalidId),
            _ => AdminAction::InvalidCommand,
        }
    }
}

/// Handle the /admin command.
///
/// `message_text` is the full message (e.g. "/admin add 5").
pub async fn handle_admin_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    message_text: &str,
    allowlist: &AllowlistStore,
) -> Result<(), HandlerError> {
    if !is_operator(user_id) {
        log::warn!("User {} tried to access /admin without permission", user_id);
        bot.send_message(chat_id, "❌ This command is restricted to the operator.")
            .await?;
        return Ok(());
    }

    // Everything after the command name (tolerates "/admin@botname").
    let args = message_text
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest)
        .unwrap_or("");

    let reply = match AdminAction::parse(args) {
        AdminAction::List => {
            let users = allowlist.list().await;
            let listing = if users.is_empty() {
                "(empty)".to_string()
            } else {
                users.iter().map(|id| format!("- {}", id)).collect::<Vec<_>>().join("\n")
            };
            format!(
                "📋 Allow-listed users:\n{}\n\n\
                ⚙️ Admin commands:\n\
                /admin add <user_id> - add a user.\n\
                /admin remove <user_id> - remove a user.",
                listing
            )
        }
        AdminAction::Add(id) => {
            if allowlist.add(id).await? {
                format!("✅ User {} added.", id)
            } else {
                "⚠️ That user is already allow-listed.".to_string()
            }
        }
        AdminAction::Remove(id) => {
            if allowlist.remove(id).await? {
                format!("✅ User {} removed.", id)
            } else {
                "⚠️ That user is not in the list.".to_string()
            }
        }
        AdminAction::InvalidId => "❌ Invalid user ID.".to_string(),
        AdminAction::InvalidCommand => "❌ Invalid admin command.".to_string(),
    };

    bot.send_message(chat_id, reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_lists() {
        assert_eq!(AdminAction::parse(""), AdminAction::List);
        assert_eq!(AdminAction::parse("   "), AdminAction::List);
    }

    #[test]
    fn test_parse_add_and_remove() {
        assert_eq!(AdminAction::parse("add 5"), AdminAction::Add(5));
        assert_eq!(AdminAction::parse("remove 42"), AdminAction::Remove(42));
        assert_eq!(AdminAction::parse("ADD 5"), AdminAction::Add(5));
    }

    #[test]
    fn test_parse_rejects_non_integer_ids() {
        assert_eq!(AdminAction::parse("add five"), AdminAction::InvalidId);
        assert_eq!(AdminAction::parse("remove 1.5"), AdminAction::InvalidId);
    }

    #[test]
    fn test_parse_rejects_unknown_or_malformed_commands() {
        assert_eq!(AdminAction::parse("ban 5"), AdminAction::InvalidCommand);
        assert_eq!(AdminAction::parse("add"), AdminAction::InvalidCommand);
        assert_eq!(AdminAction::parse("add 5 6"), AdminAction::InvalidCommand);
        assert_eq!(AdminAction::parse("remove"), AdminAction::InvalidCommand);
    }
}
