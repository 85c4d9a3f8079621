//! Mapping from teloxide messages to the core update model.
//!
//! Kept as pure functions so the flattening is unit-testable without a
//! network-backed bot.

use teloxide::types::Message;

use kono_core::{
    domain::{ChatId, FileId},
    update::{Document, PhotoVariant, Update},
};

/// Flatten a Telegram message into the core update shape.
///
/// Telegram sends photo sizes in ascending resolution order; that order is
/// preserved here because the dispatcher selects by rank.
pub fn map_message(msg: &Message) -> Update {
    let mut update = Update::new(ChatId(msg.chat.id.0));

    update.first_name = msg.chat.first_name().map(|s| s.to_string());
    update.last_name = msg.chat.last_name().map(|s| s.to_string());
    update.text = msg.text().map(|s| s.to_string());

    update.photo = msg.photo().map(|sizes| {
        sizes
            .iter()
            .map(|size| PhotoVariant {
                file_id: FileId(size.file.id.clone()),
                width: size.width,
                height: size.height,
            })
            .collect()
    });

    update.document = msg.document().map(|doc| Document {
        thumbnail: doc.thumb.as_ref().map(|t| FileId(t.file.id.clone())),
        file_name: doc.file_name.clone(),
    });

    update
}
