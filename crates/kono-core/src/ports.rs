use async_trait::async_trait;

use crate::{
    domain::{ChatId, FileId, User},
    Result,
};

/// Persistence port for user identity.
///
/// The store exclusively owns persisted users; the dispatcher only holds a
/// transient copy per update.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: ChatId) -> Result<Option<User>>;

    /// Idempotent insert-if-absent keyed by `User::id`; returns the stored
    /// record. Concurrent first-contact saves for the same id must both
    /// succeed, with the first write winning.
    async fn save(&self, user: &User) -> Result<User>;
}

/// Opaque external capability backing the `/service` command.
///
/// What it does internally is none of the dispatcher's business; it only
/// produces the reply string.
#[async_trait]
pub trait CommandResponder: Send + Sync {
    async fn respond(&self) -> Result<String>;
}

/// Resolves a platform file id to an absolute download location.
#[async_trait]
pub trait FileResolver: Send + Sync {
    async fn resolve_file(&self, file_id: &FileId) -> Result<String>;
}

/// Outbound messaging port.
///
/// Telegram is the first implementation; the shape leaves room for other
/// messengers behind the same interface. `formatted` requests rich-text
/// (Markdown-style) rendering. Delivery is fire-and-forget from the
/// dispatcher's perspective.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str, formatted: bool) -> Result<()>;
}
