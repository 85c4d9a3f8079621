//! Update dispatch: identity resolution, content classification, command
//! routing.
//!
//! The dispatcher turns one inbound [`Update`] into a resolved [`User`] plus a
//! sequence of [`OutboundAction`]s. It is the only place in the bot that
//! branches on update shape.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    domain::User,
    ports::{CommandResponder, FileResolver, UserStore},
    update::{Document, OutboundAction, PhotoVariant, Update},
    Result,
};

/// Number of resolution variants the platform sends per photo. The last one
/// is the highest resolution.
pub const PHOTO_VARIANT_COUNT: usize = 3;
const BEST_PHOTO_INDEX: usize = 2;

const WELCOME_TEXT: &str = "**/start** command received. All set <3";
const FALLBACK_TEXT: &str = "Oh, that's something new. I do not know this command yet";

/// Recognized text commands. Matches are exact and case-sensitive; everything
/// else — including empty text — routes to the fallback reply, which makes
/// the default branch a first-class case instead of an implicit one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Service,
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        match text {
            "/start" => Self::Start,
            "/service" => Self::Service,
            _ => Self::Unknown,
        }
    }
}

/// Orchestrates per-update handling.
///
/// Constructed once at startup and shared with the transport adapter; owns
/// handles to its collaborators instead of reaching for globals.
pub struct UpdateDispatcher {
    store: Arc<dyn UserStore>,
    responder: Arc<dyn CommandResponder>,
    files: Arc<dyn FileResolver>,
}

impl UpdateDispatcher {
    pub fn new(
        store: Arc<dyn UserStore>,
        responder: Arc<dyn CommandResponder>,
        files: Arc<dyn FileResolver>,
    ) -> Self {
        Self {
            store,
            responder,
            files,
        }
    }

    /// Handle one update.
    ///
    /// Identity resolution runs first; its failure abandons the whole update
    /// (replies cannot be addressed without a user id) and yields `Err`. The
    /// photo, document, and text branches then run independently, in that
    /// order. Branch-local failures — a short photo variant list, an
    /// unresolvable file — are logged and skipped without affecting the
    /// other branches.
    pub async fn handle(&self, update: &Update) -> Result<Vec<OutboundAction>> {
        let user = self.resolve_user(update).await?;
        let mut actions = Vec::new();

        if let Some(variants) = &update.photo {
            self.handle_photo(variants, &mut actions).await;
        }

        if let Some(document) = &update.document {
            self.handle_document(document, &mut actions).await;
        }

        if let Some(text) = &update.text {
            self.handle_text(&user, text, &mut actions).await?;
        }

        Ok(actions)
    }

    /// Handle a delivery batch sequentially, in the order received.
    ///
    /// One update's actions never interleave with another's. A failed update
    /// is logged and dropped; the rest of the batch still runs.
    pub async fn handle_batch(&self, updates: &[Update]) -> Vec<OutboundAction> {
        let mut actions = Vec::new();
        for update in updates {
            match self.handle(update).await {
                Ok(mut produced) => actions.append(&mut produced),
                Err(e) => error!("dropping update for chat {}: {e}", update.chat_id.0),
            }
        }
        actions
    }

    /// Get-or-create by chat id.
    ///
    /// `save` is an insert-if-absent, so concurrent first contacts for the
    /// same id converge on one stored record; whichever write landed first
    /// is what comes back.
    async fn resolve_user(&self, update: &Update) -> Result<User> {
        if let Some(user) = self.store.find_by_id(update.chat_id).await? {
            return Ok(user);
        }

        self.store
            .save(&User {
                id: update.chat_id,
                first_name: update.first_name.clone(),
                last_name: update.last_name.clone(),
            })
            .await
    }

    async fn handle_photo(&self, variants: &[PhotoVariant], actions: &mut Vec<OutboundAction>) {
        if variants.len() < PHOTO_VARIANT_COUNT {
            let err = crate::Error::MalformedUpdate(format!(
                "photo update carries {} variants, expected {PHOTO_VARIANT_COUNT}",
                variants.len()
            ));
            warn!("skipping photo branch: {err}");
            return;
        }

        // Three sizes of the same photo; index 2 is the highest resolution.
        let best = &variants[BEST_PHOTO_INDEX];
        match self.files.resolve_file(&best.file_id).await {
            Ok(location) => actions.push(OutboundAction::LogEvent {
                message: format!("Received photo: {location}"),
            }),
            Err(e) => warn!("could not resolve photo {}: {e}", best.file_id.0),
        }
    }

    async fn handle_document(&self, document: &Document, actions: &mut Vec<OutboundAction>) {
        let Some(thumbnail) = &document.thumbnail else {
            debug!("document without thumbnail; nothing to resolve");
            return;
        };

        match self.files.resolve_file(thumbnail).await {
            Ok(location) => actions.push(OutboundAction::LogEvent {
                message: format!("Received file: {location}"),
            }),
            Err(e) => warn!("could not resolve document thumbnail {}: {e}", thumbnail.0),
        }
    }

    async fn handle_text(
        &self,
        user: &User,
        text: &str,
        actions: &mut Vec<OutboundAction>,
    ) -> Result<()> {
        actions.push(OutboundAction::LogEvent {
            message: format!("Received text: {text}"),
        });

        let (reply, formatted) = match Command::parse(text) {
            Command::Start => (WELCOME_TEXT.to_string(), true),
            Command::Service => (self.responder.respond().await?, false),
            Command::Unknown => (FALLBACK_TEXT.to_string(), false),
        };

        actions.push(OutboundAction::SendText {
            chat_id: user.id,
            text: reply,
            formatted,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::{
        domain::{ChatId, FileId},
        store::InMemoryUserStore,
        Error,
    };

    struct FixedResponder;

    #[async_trait]
    impl CommandResponder for FixedResponder {
        async fn respond(&self) -> Result<String> {
            Ok("service says hi".to_string())
        }
    }

    /// Resolves every file id to a predictable fake URL.
    struct FakeResolver;

    #[async_trait]
    impl FileResolver for FakeResolver {
        async fn resolve_file(&self, file_id: &FileId) -> Result<String> {
            Ok(format!("https://files.example/{}", file_id.0))
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl FileResolver for FailingResolver {
        async fn resolve_file(&self, _file_id: &FileId) -> Result<String> {
            Err(Error::FileResolve("lookup timed out".to_string()))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl UserStore for FailingStore {
        async fn find_by_id(&self, _id: ChatId) -> Result<Option<User>> {
            Err(Error::Store("db is down".to_string()))
        }

        async fn save(&self, _user: &User) -> Result<User> {
            Err(Error::Store("db is down".to_string()))
        }
    }

    fn dispatcher_with(store: Arc<dyn UserStore>) -> UpdateDispatcher {
        UpdateDispatcher::new(store, Arc::new(FixedResponder), Arc::new(FakeResolver))
    }

    fn dispatcher() -> (UpdateDispatcher, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        (dispatcher_with(store.clone()), store)
    }

    fn text_update(chat_id: i64, text: &str) -> Update {
        let mut update = Update::new(ChatId(chat_id));
        update.first_name = Some("Kestutis".to_string());
        update.last_name = Some("Kono".to_string());
        update.text = Some(text.to_string());
        update
    }

    fn variants(ids: [&str; 3]) -> Vec<PhotoVariant> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| PhotoVariant {
                file_id: FileId(id.to_string()),
                width: 90 * (i as u32 + 1),
                height: 90 * (i as u32 + 1),
            })
            .collect()
    }

    fn photo_update(chat_id: i64) -> Update {
        let mut update = Update::new(ChatId(chat_id));
        update.photo = Some(variants(["ph-small", "ph-medium", "ph-large"]));
        update
    }

    fn send_texts(actions: &[OutboundAction]) -> Vec<&OutboundAction> {
        actions
            .iter()
            .filter(|a| matches!(a, OutboundAction::SendText { .. }))
            .collect()
    }

    #[test]
    fn command_matching_is_exact_and_case_sensitive() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/service"), Command::Service);
        assert_eq!(Command::parse("/Start"), Command::Unknown);
        assert_eq!(Command::parse("/start now"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
    }

    #[tokio::test]
    async fn first_contact_creates_user_with_update_names() {
        let (dispatcher, store) = dispatcher();

        dispatcher.handle(&text_update(42, "hello")).await.unwrap();

        assert_eq!(store.len().await, 1);
        let user = store.find_by_id(ChatId(42)).await.unwrap().unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Kestutis"));
        assert_eq!(user.last_name.as_deref(), Some("Kono"));
    }

    #[tokio::test]
    async fn known_user_names_are_never_resynced() {
        let (dispatcher, store) = dispatcher();
        store
            .save(&User {
                id: ChatId(42),
                first_name: Some("Original".to_string()),
                last_name: None,
            })
            .await
            .unwrap();

        dispatcher.handle(&text_update(42, "hello")).await.unwrap();

        let user = store.find_by_id(ChatId(42)).await.unwrap().unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Original"));
        assert_eq!(user.last_name, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn start_command_gets_formatted_welcome() {
        let (dispatcher, _) = dispatcher();

        let actions = dispatcher.handle(&text_update(42, "/start")).await.unwrap();

        let sends = send_texts(&actions);
        assert_eq!(sends.len(), 1);
        let OutboundAction::SendText {
            chat_id,
            text,
            formatted,
        } = sends[0]
        else {
            unreachable!()
        };
        assert_eq!(*chat_id, ChatId(42));
        assert!(text.contains("/start"));
        assert!(*formatted);
    }

    #[tokio::test]
    async fn service_command_relays_responder_reply_unformatted() {
        let (dispatcher, _) = dispatcher();

        let actions = dispatcher
            .handle(&text_update(42, "/service"))
            .await
            .unwrap();

        let sends = send_texts(&actions);
        assert_eq!(sends.len(), 1);
        assert_eq!(
            sends[0],
            &OutboundAction::SendText {
                chat_id: ChatId(42),
                text: "service says hi".to_string(),
                formatted: false,
            }
        );
    }

    #[tokio::test]
    async fn unrecognized_and_empty_text_fall_back() {
        let (dispatcher, _) = dispatcher();

        for text in ["/unknown", ""] {
            let actions = dispatcher.handle(&text_update(42, text)).await.unwrap();

            let sends = send_texts(&actions);
            assert_eq!(sends.len(), 1, "text {text:?}");
            assert_eq!(
                sends[0],
                &OutboundAction::SendText {
                    chat_id: ChatId(42),
                    text: FALLBACK_TEXT.to_string(),
                    formatted: false,
                }
            );
        }
    }

    #[tokio::test]
    async fn photo_update_logs_highest_resolution_variant() {
        let (dispatcher, _) = dispatcher();

        let actions = dispatcher.handle(&photo_update(42)).await.unwrap();

        assert_eq!(
            actions,
            vec![OutboundAction::LogEvent {
                message: "Received photo: https://files.example/ph-large".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn document_thumbnail_is_resolved_and_logged() {
        let (dispatcher, _) = dispatcher();
        let mut update = Update::new(ChatId(42));
        update.document = Some(Document {
            thumbnail: Some(FileId("doc-thumb".to_string())),
            file_name: Some("notes.pdf".to_string()),
        });

        let actions = dispatcher.handle(&update).await.unwrap();

        assert_eq!(
            actions,
            vec![OutboundAction::LogEvent {
                message: "Received file: https://files.example/doc-thumb".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn document_without_thumbnail_is_skipped() {
        let (dispatcher, _) = dispatcher();
        let mut update = Update::new(ChatId(42));
        update.document = Some(Document {
            thumbnail: None,
            file_name: Some("notes.pdf".to_string()),
        });

        let actions = dispatcher.handle(&update).await.unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn photo_and_text_branches_both_run_in_source_order() {
        let (dispatcher, _) = dispatcher();
        let mut update = text_update(42, "/start");
        update.photo = Some(variants(["ph-small", "ph-medium", "ph-large"]));

        let actions = dispatcher.handle(&update).await.unwrap();

        assert_eq!(
            actions,
            vec![
                OutboundAction::LogEvent {
                    message: "Received photo: https://files.example/ph-large".to_string(),
                },
                OutboundAction::LogEvent {
                    message: "Received text: /start".to_string(),
                },
                OutboundAction::SendText {
                    chat_id: ChatId(42),
                    text: WELCOME_TEXT.to_string(),
                    formatted: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn short_variant_list_skips_only_the_photo_branch() {
        let (dispatcher, _) = dispatcher();
        let mut update = text_update(42, "hello");
        update.photo = Some(vec![PhotoVariant {
            file_id: FileId("ph-only".to_string()),
            width: 90,
            height: 90,
        }]);

        let actions = dispatcher.handle(&update).await.unwrap();

        assert_eq!(
            actions,
            vec![
                OutboundAction::LogEvent {
                    message: "Received text: hello".to_string(),
                },
                OutboundAction::SendText {
                    chat_id: ChatId(42),
                    text: FALLBACK_TEXT.to_string(),
                    formatted: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn resolution_failure_skips_the_dependent_log_event() {
        let store = Arc::new(InMemoryUserStore::new());
        let dispatcher = UpdateDispatcher::new(
            store,
            Arc::new(FixedResponder),
            Arc::new(FailingResolver),
        );

        let mut update = photo_update(42);
        update.document = Some(Document {
            thumbnail: Some(FileId("doc-thumb".to_string())),
            file_name: None,
        });

        let actions = dispatcher.handle(&update).await.unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn store_failure_abandons_the_update() {
        let dispatcher = dispatcher_with(Arc::new(FailingStore));

        let result = dispatcher.handle(&text_update(42, "/start")).await;
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn batch_actions_never_interleave() {
        let (dispatcher, _) = dispatcher();
        let mut first = text_update(1, "/start");
        first.photo = Some(variants(["a-small", "a-medium", "a-large"]));
        let second = text_update(2, "hello");

        let actions = dispatcher.handle_batch(&[first, second]).await;

        assert_eq!(
            actions,
            vec![
                OutboundAction::LogEvent {
                    message: "Received photo: https://files.example/a-large".to_string(),
                },
                OutboundAction::LogEvent {
                    message: "Received text: /start".to_string(),
                },
                OutboundAction::SendText {
                    chat_id: ChatId(1),
                    text: WELCOME_TEXT.to_string(),
                    formatted: true,
                },
                OutboundAction::LogEvent {
                    message: "Received text: hello".to_string(),
                },
                OutboundAction::SendText {
                    chat_id: ChatId(2),
                    text: FALLBACK_TEXT.to_string(),
                    formatted: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn batch_continues_past_a_failed_update() {
        let (dispatcher, store) = dispatcher();
        // An update whose only branch is a broken photo still succeeds with
        // zero actions; pair it with a store-level failure via a fresh
        // dispatcher to exercise the drop-and-continue path.
        let failing = dispatcher_with(Arc::new(FailingStore));
        let dropped = failing.handle_batch(&[text_update(1, "hi")]).await;
        assert!(dropped.is_empty());

        let actions = dispatcher
            .handle_batch(&[text_update(1, "hi"), text_update(2, "hi")])
            .await;
        assert_eq!(send_texts(&actions).len(), 2);
        assert_eq!(store.len().await, 2);
    }
}
