use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use cove_core::messaging::{Chat, Message, MessageSender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PostMessageRequest {
    body: String,
}

#[derive(Debug, Serialize)]
struct ThreadResponse {
    chat: Chat,
    messages: Vec<Message>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/chats/{chat_id}/messages",
        get(read_thread).post(send_message),
    )
}

async fn read_thread(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ThreadResponse>, AppError> {
    let chat = state
        .chats
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Chat {} not found", chat_id)))?;

    let messages = state.chats.list_messages(chat_id).await?;

    Ok(Json(ThreadResponse { chat, messages }))
}

/// Guest writes into their reservation thread; staff get a mail nudge so
/// the inbox is not the only place the message surfaces.
async fn send_message(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<Message>, AppError> {
    if req.body.trim().is_empty() {
        return Err(AppError::ValidationError(
            "message body must not be empty".to_string(),
        ));
    }

    let chat = state
        .chats
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Chat {} not found", chat_id)))?;

    let message = Message::new(chat_id, MessageSender::Guest, req.body);
    state.chats.append_message(&message).await?;

    state.notifier.guest_message_alert(&chat, &message).await;

    Ok(Json(message))
}
