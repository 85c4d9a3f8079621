//! Telegram adapter (teloxide).
//!
//! This crate implements the kono-core messaging and file-resolution ports
//! over the Telegram Bot API and owns the long-polling loop.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

use tokio::time::sleep;

pub mod inbound;
pub mod router;

use kono_core::{
    domain::{ChatId, FileId},
    errors::Error,
    ports::{FileResolver, MessagingPort},
    Result,
};

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramGateway {
    async fn send_text(&self, chat_id: ChatId, text: &str, formatted: bool) -> Result<()> {
        self.with_retry(|| {
            let req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
            if formatted {
                req.parse_mode(ParseMode::Markdown)
            } else {
                req
            }
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl FileResolver for TelegramGateway {
    /// Resolve a file id to its absolute download URL.
    ///
    /// Telegram's `getFile` returns a relative path that is only valid under
    /// the bot-token-scoped file endpoint.
    async fn resolve_file(&self, file_id: &FileId) -> Result<String> {
        let file = self
            .with_retry(|| self.bot.get_file(file_id.0.clone()))
            .await
            .map_err(|e| match e {
                Error::Transport(msg) => Error::FileResolve(msg),
                other => other,
            })?;

        Ok(format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        ))
    }
}
