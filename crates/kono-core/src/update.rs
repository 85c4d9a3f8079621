use crate::domain::{ChatId, FileId};

/// One inbound event from the messaging platform.
///
/// The three payload branches are independent, not mutually exclusive: an
/// update may carry any combination of text, photo, and document, and the
/// dispatcher walks every branch that is present. Updates are ephemeral —
/// processed once, never stored.
#[derive(Clone, Debug)]
pub struct Update {
    pub chat_id: ChatId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub text: Option<String>,
    pub photo: Option<Vec<PhotoVariant>>,
    pub document: Option<Document>,
}

impl Update {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            first_name: None,
            last_name: None,
            text: None,
            photo: None,
            document: None,
        }
    }
}

/// One resolution variant of a photo attachment.
///
/// The platform sends variants in ascending resolution order; adapters must
/// preserve that order because the dispatcher selects by rank.
#[derive(Clone, Debug)]
pub struct PhotoVariant {
    pub file_id: FileId,
    pub width: u32,
    pub height: u32,
}

/// A document attachment. Only the thumbnail is ever resolved by this bot,
/// never the document body — and Telegram does not guarantee one exists.
#[derive(Clone, Debug)]
pub struct Document {
    pub thumbnail: Option<FileId>,
    pub file_name: Option<String>,
}

/// Outbound effect produced by the dispatcher, executed by the transport
/// adapter in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundAction {
    SendText {
        chat_id: ChatId,
        text: String,
        formatted: bool,
    },
    LogEvent {
        message: String,
    },
}
