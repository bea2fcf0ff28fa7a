use async_trait::async_trait;
use uuid::Uuid;

use crate::guests::{GuestBooking, GuestIdentity};
use crate::messaging::{Chat, Message};

/// Repository trait for conversation threads and their messages
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create_chat(
        &self,
        chat: &Chat,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_chat(
        &self,
        chat_id: Uuid,
    ) -> Result<Option<Chat>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<Option<Chat>, Box<dyn std::error::Error + Send + Sync>>;

    /// Inbox listing, most recently active first.
    async fn list_chats(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Chat>, Box<dyn std::error::Error + Send + Sync>>;

    /// Store a message and refresh the thread preview. Guest messages
    /// bump the thread's unread counter; admin replies do not.
    async fn append_message(
        &self,
        message: &Message,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_messages(
        &self,
        chat_id: Uuid,
    ) -> Result<Vec<Message>, Box<dyn std::error::Error + Send + Sync>>;

    /// Clear the unread counter and mark guest messages as seen.
    async fn mark_read(
        &self,
        chat_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Unread guest messages across all threads (inbox badge).
    async fn total_unread(&self) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for guest registration records
#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn create_booking(
        &self,
        booking: &GuestBooking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_booking(
        &self,
        booking_code: &str,
    ) -> Result<Option<GuestBooking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Append traveller identities to a booking and flag it for re-sync.
    async fn append_guests(
        &self,
        booking_code: &str,
        guests: &[GuestIdentity],
    ) -> Result<GuestBooking, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_bookings(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GuestBooking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn mark_synced(
        &self,
        booking_code: &str,
        succeeded: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
