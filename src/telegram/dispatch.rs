//! Update dispatching: translates Bot API updates into conversation events
//! and delivers the resulting renders.

use std::sync::Arc;

use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{MaybeInaccessibleMessage, Message};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::keyboard::inline_markup;
use crate::conversation::{
    Action, BotCommand, Conversation, Event, Render, RenderMode, UserId,
};

/// Errors raised while delivering a render.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Bot API request failed: {0}")]
    Request(#[from] RequestError),
}

/// Maps message text to a conversation event.
///
/// Unknown `/commands` are not events.
pub fn message_event(text: &str) -> Option<Event> {
    if text.starts_with('/') {
        return BotCommand::parse(text).map(Event::Command);
    }
    Some(Event::Text(text.to_owned()))
}

/// Maps callback data to a conversation event.
pub fn callback_event(data: &str) -> Option<Event> {
    Action::parse(data).map(Event::Select)
}

/// Runs the long-polling dispatcher until Ctrl+C.
pub async fn run(bot: Bot, conversation: Arc<Conversation>) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("Dispatcher started");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![conversation])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
}

async fn on_message(
    bot: Bot,
    msg: Message,
    conversation: Arc<Conversation>,
) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let (Some(from), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };

    let user = UserId(from.id.0);
    let Some(event) = message_event(text) else {
        debug!("Ignoring unknown command from user {}", user.masked());
        return Ok(());
    };

    if let Some(outcome) = conversation.handle(user, event).await
        && let Err(e) = deliver(&bot, msg.chat.id, None, &outcome.render).await
    {
        error!("Failed to reply to user {}: {}", user.masked(), e);
    }

    Ok(())
}

async fn on_callback(
    bot: Bot,
    q: CallbackQuery,
    conversation: Arc<Conversation>,
) -> ResponseResult<()> {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {}", e);
    }

    let user = UserId(q.from.id.0);
    let Some(event) = q.data.as_deref().and_then(callback_event) else {
        warn!("Unrecognized callback data from user {}", user.masked());
        return Ok(());
    };

    if let Some(outcome) = conversation.handle(user, event).await {
        let source = q
            .message
            .as_ref()
            .and_then(MaybeInaccessibleMessage::regular_message);
        if let Err(e) = deliver(&bot, ChatId::from(q.from.id), source, &outcome.render).await {
            error!("Failed to update menu for user {}: {}", user.masked(), e);
        }
    }

    Ok(())
}

/// Sends or edits according to the render mode.
///
/// An edit render without a reachable source message is sent as a new
/// message instead.
async fn deliver(
    bot: &Bot,
    chat: ChatId,
    source: Option<&Message>,
    render: &Render,
) -> Result<(), TransportError> {
    let markup = inline_markup(&render.keyboard);

    if let (RenderMode::Edit, Some(source)) = (render.mode, source) {
        let mut request = bot.edit_message_text(source.chat.id, source.id, &render.text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        return Ok(());
    }

    let mut request = bot.send_message(chat, &render.text);
    if let Some(markup) = markup {
        request = request.reply_markup(markup);
    }
    request.await?;
    Ok(())
}
