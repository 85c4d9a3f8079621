use std::sync::Arc;

use teloxide::Bot;

use kono_core::{config::Config, dispatch::UpdateDispatcher};
use kono_store::SqliteUserStore;
use kono_telegram::TelegramGateway;

mod service;

use service::ExampleResponder;

#[tokio::main]
async fn main() -> Result<(), kono_core::Error> {
    kono_core::logging::init("kono")?;

    let cfg = Config::load()?;

    let store = Arc::new(SqliteUserStore::new(&cfg.database_path.to_string_lossy()).await?);
    let responder = Arc::new(ExampleResponder::new(cfg.service_reply.clone()));

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let gateway = Arc::new(TelegramGateway::new(bot.clone()));

    let dispatcher = Arc::new(UpdateDispatcher::new(store, responder, gateway.clone()));

    kono_telegram::router::run_polling(bot, dispatcher, gateway)
        .await
        .map_err(|e| kono_core::Error::Transport(format!("telegram bot failed: {e}")))?;

    Ok(())
}
