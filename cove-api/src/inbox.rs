use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cove_core::messaging::{Chat, Message, MessageSender};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
struct ReplyRequest {
    body: String,
}

#[derive(Debug, Serialize)]
struct UnreadResponse {
    unread: i64,
}

#[derive(Debug, Serialize)]
struct ThreadResponse {
    chat: Chat,
    messages: Vec<Message>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/inbox", get(list_inbox))
        .route("/v1/admin/inbox/unread", get(unread_count))
        .route(
            "/v1/admin/inbox/{chat_id}/messages",
            get(open_thread).post(reply),
        )
}

async fn list_inbox(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Chat>>, AppError> {
    let chats = state.chats.list_chats(page.limit, page.offset).await?;
    Ok(Json(chats))
}

async fn unread_count(State(state): State<AppState>) -> Result<Json<UnreadResponse>, AppError> {
    let unread = state.chats.total_unread().await?;
    Ok(Json(UnreadResponse { unread }))
}

/// Opening a thread counts as reading it: the unread counter resets before
/// the messages go back to the client.
async fn open_thread(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ThreadResponse>, AppError> {
    let chat = state
        .chats
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Chat {} not found", chat_id)))?;

    state.chats.mark_read(chat_id).await?;
    let messages = state.chats.list_messages(chat_id).await?;

    Ok(Json(ThreadResponse {
        chat: Chat { unread: 0, ..chat },
        messages,
    }))
}

async fn reply(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<ReplyRequest>,
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

    let message = Message::new(chat_id, MessageSender::Admin, req.body);
    state.chats.append_message(&message).await?;

    // The guest's address lives on the order that opened this thread.
    match state.orders.find_by_reference(&chat.booking_reference).await? {
        Some(order) => {
            state
                .notifier
                .admin_reply_alert(&order.email.0, &chat, &message)
                .await;
        }
        None => {
            debug!(
                reference = %chat.booking_reference,
                "no order found for chat, skipping reply alert"
            );
        }
    }

    Ok(Json(message))
}
