use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Guest,
    Admin,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::Guest => "guest",
            MessageSender::Admin => "admin",
        }
    }
}

/// One conversation thread, opened per reservation at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: Uuid,
    pub reservation_id: i64,
    pub booking_reference: String,
    pub guest_name: String,
    /// Denormalised preview for the inbox list.
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    /// Guest messages not yet seen by staff. Admin replies never count here.
    pub unread: i32,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(reservation_id: i64, booking_reference: String, guest_name: String) -> Self {
        Chat {
            chat_id: Uuid::new_v4(),
            reservation_id,
            booking_reference,
            guest_name,
            last_message: None,
            last_message_at: None,
            unread: 0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub chat_id: Uuid,
    pub sender: MessageSender,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(chat_id: Uuid, sender: MessageSender, body: String) -> Self {
        Message {
            message_id: Uuid::new_v4(),
            chat_id,
            sender,
            // Admin replies are born read; guest messages wait for staff.
            read: sender == MessageSender::Admin,
            body,
            created_at: Utc::now(),
        }
    }
}
