use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tracing::{error, info};

use kono_core::{dispatch::UpdateDispatcher, ports::MessagingPort, update::OutboundAction};

use crate::inbound::map_message;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<UpdateDispatcher>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Long-polling loop.
///
/// The adapter owns the loop so the dispatcher stays loop-free: each incoming
/// message is flattened, handled, and its actions executed in emission order
/// before the next one from the same chat is picked up.
pub async fn run_polling(
    bot: Bot,
    dispatcher: Arc<UpdateDispatcher>,
    messenger: Arc<dyn MessagingPort>,
) -> anyhow::Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!("kono bot started: @{}", me.username());
    }

    let state = Arc::new(AppState {
        dispatcher,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let update = map_message(&msg);

    let actions = match state.dispatcher.handle(&update).await {
        Ok(actions) => actions,
        Err(e) => {
            // The only user-visible failure mode is silence: without a
            // resolved user there is nobody to address a reply to.
            error!("dropping update for chat {}: {e}", update.chat_id.0);
            return Ok(());
        }
    };

    execute_actions(&*state.messenger, actions).await;
    Ok(())
}

/// Drain dispatcher actions in order.
///
/// Send failures are logged, not retried here; delivery is fire-and-forget
/// from the core's perspective.
pub async fn execute_actions(messenger: &dyn MessagingPort, actions: Vec<OutboundAction>) {
    for action in actions {
        match action {
            OutboundAction::LogEvent { message } => info!("{message}"),
            OutboundAction::SendText {
                chat_id,
                text,
                formatted,
            } => {
                if let Err(e) = messenger.send_text(chat_id, &text, formatted).await {
                    error!("send to chat {} failed: {e}", chat_id.0);
                }
            }
        }
    }
}
