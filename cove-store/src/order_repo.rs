use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cove_core::pii::Masked;
use cove_order::{CompanyDetails, Order, OrderItem, OrderRepository};
use sqlx::{FromRow, PgPool};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flat row shape; `items` stays JSONB so order lines keep their cart
/// snapshot without a table per item type.
#[derive(FromRow)]
struct OrderRow {
    order_id: String,
    guest_name: String,
    email: String,
    phone: String,
    notes: Option<String>,
    company_name: Option<String>,
    tax_number: Option<String>,
    items: serde_json::Value,
    reservation_ids: Vec<i64>,
    reservation_references: Vec<String>,
    transaction_ids: Vec<i64>,
    payment_id: String,
    amount_minor: i64,
    currency: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, serde_json::Error> {
        let items: Vec<OrderItem> = serde_json::from_value(self.items)?;
        let company = self
            .company_name
            .zip(self.tax_number)
            .map(|(company_name, tax_number)| CompanyDetails { company_name, tax_number });
        Ok(Order {
            order_id: self.order_id,
            guest_name: self.guest_name,
            email: Masked(self.email),
            phone: Masked(self.phone),
            notes: self.notes,
            company,
            items,
            reservation_ids: self.reservation_ids,
            reservation_references: self.reservation_references,
            transaction_ids: self.transaction_ids,
            payment_id: self.payment_id,
            amount_minor: self.amount_minor,
            currency: self.currency,
            created_at: self.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "order_id, guest_name, email, phone, notes, company_name, tax_number, \
     items, reservation_ids, reservation_references, transaction_ids, payment_id, amount_minor, \
     currency, created_at";

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO orders (order_id, guest_name, email, phone, notes, company_name, \
             tax_number, items, reservation_ids, reservation_references, transaction_ids, \
             payment_id, amount_minor, currency, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(&order.order_id)
        .bind(&order.guest_name)
        .bind(&order.email.0)
        .bind(&order.phone.0)
        .bind(&order.notes)
        .bind(order.company.as_ref().map(|c| c.company_name.clone()))
        .bind(order.company.as_ref().map(|c| c.tax_number.clone()))
        .bind(serde_json::to_value(&order.items)?)
        .bind(&order.reservation_ids)
        .bind(&order.reservation_references)
        .bind(&order.transaction_ids)
        .bind(&order.payment_id)
        .bind(order.amount_minor)
        .bind(&order.currency)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_order(
        &self,
        order_id: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(OrderRow::into_order).transpose()?)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE $1 = ANY(reservation_references)"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(OrderRow::into_order).transpose()?)
    }

    async fn list_orders(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|row| row.into_order().map_err(Into::into)).collect()
    }

    async fn attach_invoice(
        &self,
        order_id: &str,
        item_index: usize,
        invoice_url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| format!("order {order_id} not found"))?;

        let mut order = row.into_order()?;
        let item = order
            .items
            .get_mut(item_index)
            .ok_or_else(|| format!("order {order_id} has no item {item_index}"))?;
        item.invoice_url = Some(invoice_url.to_string());

        sqlx::query("UPDATE orders SET items = $2 WHERE order_id = $1")
            .bind(order_id)
            .bind(serde_json::to_value(&order.items)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_order(
        &self,
        order_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
