use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cove_core::messaging::{Chat, Message, MessageSender};
use cove_core::repository::ChatRepository;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChatRow {
    chat_id: Uuid,
    reservation_id: i64,
    booking_reference: String,
    guest_name: String,
    last_message: Option<String>,
    last_message_at: Option<DateTime<Utc>>,
    unread: i32,
    created_at: DateTime<Utc>,
}

impl ChatRow {
    fn into_chat(self) -> Chat {
        Chat {
            chat_id: self.chat_id,
            reservation_id: self.reservation_id,
            booking_reference: self.booking_reference,
            guest_name: self.guest_name,
            last_message: self.last_message,
            last_message_at: self.last_message_at,
            unread: self.unread,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct MessageRow {
    message_id: Uuid,
    chat_id: Uuid,
    sender: String,
    read: bool,
    body: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            message_id: self.message_id,
            chat_id: self.chat_id,
            sender: match self.sender.as_str() {
                "admin" => MessageSender::Admin,
                _ => MessageSender::Guest,
            },
            read: self.read,
            body: self.body,
            created_at: self.created_at,
        }
    }
}

const CHAT_COLUMNS: &str = "chat_id, reservation_id, booking_reference, guest_name, \
     last_message, last_message_at, unread, created_at";

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn create_chat(
        &self,
        chat: &Chat,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO chats (chat_id, reservation_id, booking_reference, guest_name, \
             last_message, last_message_at, unread, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(chat.chat_id)
        .bind(chat.reservation_id)
        .bind(&chat.booking_reference)
        .bind(&chat.guest_name)
        .bind(&chat.last_message)
        .bind(chat.last_message_at)
        .bind(chat.unread)
        .bind(chat.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_chat(
        &self,
        chat_id: Uuid,
    ) -> Result<Option<Chat>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE chat_id = $1"
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ChatRow::into_chat))
    }

    async fn find_by_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<Option<Chat>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE reservation_id = $1"
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ChatRow::into_chat))
    }

    async fn list_chats(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Chat>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats \
             ORDER BY last_message_at DESC NULLS LAST, created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ChatRow::into_chat).collect())
    }

    async fn append_message(
        &self,
        message: &Message,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO messages (message_id, chat_id, sender, read, body, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.message_id)
        .bind(message.chat_id)
        .bind(message.sender.as_str())
        .bind(message.read)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        // The increment runs inside the statement, so concurrent guest
        // messages cannot lose counts to a stale read.
        let unread_bump: i32 = if message.sender == MessageSender::Guest { 1 } else { 0 };
        sqlx::query(
            "UPDATE chats SET last_message = $2, last_message_at = $3, unread = unread + $4 \
             WHERE chat_id = $1",
        )
        .bind(message.chat_id)
        .bind(&message.body)
        .bind(message.created_at)
        .bind(unread_bump)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_messages(
        &self,
        chat_id: Uuid,
    ) -> Result<Vec<Message>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT message_id, chat_id, sender, read, body, created_at \
             FROM messages WHERE chat_id = $1 ORDER BY created_at",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    async fn mark_read(
        &self,
        chat_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE chats SET unread = 0 WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE messages SET read = TRUE WHERE chat_id = $1 AND sender = 'guest'")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn total_unread(&self) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(unread), 0)::BIGINT FROM chats")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}
