use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

/// Client seam for the tour supplier. Activity payloads are passed through
/// opaque so the storefront renders whatever the supplier publishes.
#[async_trait]
pub trait TourApi: Send + Sync {
    async fn get_activity(
        &self,
        activity_id: i64,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;

    /// Departure availability for a date window.
    async fn list_availabilities(
        &self,
        activity_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}
