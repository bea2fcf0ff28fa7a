use async_trait::async_trait;

use crate::models::Order;

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        order_id: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Look an order up by one of its reservation confirmation codes.
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Newest first.
    async fn list_orders(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Attach an invoice link to one line of an order. The only mutation
    /// an order sees after creation.
    async fn attach_invoice(
        &self,
        order_id: &str,
        item_index: usize,
        invoice_url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Returns false when no such order existed.
    async fn delete_order(
        &self,
        order_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
