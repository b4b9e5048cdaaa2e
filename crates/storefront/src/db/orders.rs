//! Order repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use validator::Validate;

use boutique_core::validation::{InsertOrder, InsertOrderItem, PaymentResult, ShippingAddress};
use boutique_core::{OrderId, PaymentMethod, ProductId, UserId, ValidationFailure};

use super::RepositoryError;
use crate::models::cart::Cart;
use crate::models::order::{Order, OrderItem};
use crate::models::product::Page;

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    payment_result: Option<Json<PaymentResult>>,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    total_price: Decimal,
    paid_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OrderItemRow {
    product_id: ProductId,
    quantity: i32,
    price: Decimal,
    name: String,
    slug: String,
    image: String,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let payment_method = self.payment_method.parse::<PaymentMethod>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
        })?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            shipping_address: self.shipping_address.0,
            payment_method,
            payment_result: self.payment_result.map(|Json(result)| result),
            items_price: self.items_price,
            shipping_price: self.shipping_price,
            tax_price: self.tax_price,
            total_price: self.total_price,
            paid_at: self.paid_at,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            items,
        })
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            name: row.name,
            slug: row.slug,
            image: row.image,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from a cart.
    ///
    /// In one transaction: insert the order and one line per cart item,
    /// decrement each product's stock and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the order or a line fails its schema.
    /// Returns `RepositoryError::OutOfStock` if a product has too little stock.
    /// Returns `RepositoryError::DataCorruption` if a cart line has a bad product id.
    pub async fn place(&self, order: &InsertOrder, cart: &Cart) -> Result<OrderId, RepositoryError> {
        order.validate().map_err(ValidationFailure::from)?;

        let mut tx = self.pool.begin().await?;

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (user_id, shipping_address, payment_method, payment_result,
                 items_price, shipping_price, tax_price, total_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(order.user_id)
        .bind(Json(&order.shipping_address))
        .bind(&order.payment_method)
        .bind(order.payment_result.as_ref().map(Json))
        .bind(order.items_price)
        .bind(order.shipping_price)
        .bind(order.tax_price)
        .bind(order.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for item in &cart.items {
            let product_id = item.product_id.parse::<ProductId>().map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid product id in cart: {e}"))
            })?;
            let line = InsertOrderItem {
                order_id,
                product_id,
                quantity: item.quantity,
                price: item.price,
                name: item.name.clone(),
                slug: item.slug.clone(),
                image: item.image.clone(),
            };
            line.validate().map_err(ValidationFailure::from)?;

            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price, name, slug, image)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(line.order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .bind(&line.name)
            .bind(&line.slug)
            .bind(&line.image)
            .execute(&mut *tx)
            .await?;

            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated == 0 {
                // Dropping the transaction rolls everything back.
                return Err(RepositoryError::OutOfStock(line.name));
            }
        }

        sqlx::query("UPDATE carts SET items = '[]'::jsonb WHERE id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, user_id = %order.user_id, lines = cart.items.len(), "Order placed");
        Ok(order_id)
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, shipping_address, payment_method, payment_result,
                   items_price, shipping_price, tax_price, total_price,
                   paid_at, delivered_at, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_id, quantity, price, name, slug, image
            FROM order_items
            WHERE order_id = $1
            ORDER BY name
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        row.into_order(items.into_iter().map(OrderItem::from).collect())
            .map(Some)
    }

    /// A user's orders, newest first. Lines are not loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: i64,
        page_size: i64,
    ) -> Result<Page<Order>, RepositoryError> {
        let (page, offset) = super::page_offset(page, page_size);
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, shipping_address, payment_method, payment_result,
                   items_price, shipping_price, tax_price, total_price,
                   paid_at, delivered_at, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let orders = rows
            .into_iter()
            .map(|row| row.into_order(Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(orders, page, page_size, total))
    }

    /// Mark an order paid and attach the payment receipt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Conflict` if it is already paid.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        receipt: &PaymentResult,
    ) -> Result<(), RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE orders
            SET is_paid = true, paid_at = now(), payment_result = $2
            WHERE id = $1 AND NOT is_paid
            ",
        )
        .bind(id)
        .bind(Json(receipt))
        .execute(self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(self.state_conflict(id, "order is already paid").await);
        }
        Ok(())
    }

    /// Mark a paid order delivered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Conflict` if it is unpaid or already delivered.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<(), RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE orders
            SET is_delivered = true, delivered_at = now()
            WHERE id = $1 AND is_paid AND NOT is_delivered
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            let paid: Option<bool> = sqlx::query_scalar("SELECT is_paid FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
            return Err(match paid {
                None => RepositoryError::NotFound,
                Some(false) => RepositoryError::Conflict("order is not paid".to_owned()),
                Some(true) => RepositoryError::Conflict("order is already delivered".to_owned()),
            });
        }
        Ok(())
    }

    /// Explain why a guarded update touched no rows.
    async fn state_conflict(&self, id: OrderId, message: &str) -> RepositoryError {
        match sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await
        {
            Ok(true) => RepositoryError::Conflict(message.to_owned()),
            Ok(false) => RepositoryError::NotFound,
            Err(e) => e.into(),
        }
    }
}
