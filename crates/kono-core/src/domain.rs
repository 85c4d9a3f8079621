/// Telegram chat id (numeric).
///
/// For this bot the conversation and the person share one key, so the chat id
/// doubles as the user id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Opaque file reference handed out by the platform for an attachment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(pub String);

/// A known chat user.
///
/// Created exactly once, on first contact, with whatever display name that
/// update carried. Never updated afterwards: platform-side name changes are
/// not re-synced, and the bot never deletes users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: ChatId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
