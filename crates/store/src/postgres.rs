use async_trait::async_trait;
use common::{CartItemId, Money, NotificationId, OrderId, ProductId, UserId};
use domain::{
    CartItem, Notification, NotificationKind, Order, OrderNumber, OrderStatus, PaymentMethod,
    PaymentStatus, Product,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{MarketStore, OrderStatusUpdate},
};

/// PostgreSQL-backed marketplace store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            seller: UserId::from_uuid(row.try_get::<Uuid, _>("seller_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get("stock")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_cart_item(row: PgRow) -> Result<CartItem> {
        let quantity: i64 = row.try_get("quantity")?;
        Ok(CartItem {
            id: CartItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            buyer: UserId::from_uuid(row.try_get::<Uuid, _>("buyer_id")?),
            product: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: u32::try_from(quantity)
                .map_err(|_| corrupt("cart quantity", &quantity.to_string()))?,
            price_snapshot: Money::from_cents(row.try_get("price_snapshot_cents")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let items: serde_json::Value = row.try_get("items")?;
        let delivery_address: serde_json::Value = row.try_get("delivery_address")?;
        let payment_result: Option<serde_json::Value> = row.try_get("payment_result")?;
        let status: String = row.try_get("status")?;
        let payment_method: String = row.try_get("payment_method")?;
        let payment_status: String = row.try_get("payment_status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            number: OrderNumber::new(row.try_get("order_number")?),
            buyer: UserId::from_uuid(row.try_get::<Uuid, _>("buyer_id")?),
            buyer_name: row.try_get("buyer_name")?,
            buyer_phone: row.try_get("buyer_phone")?,
            items: serde_json::from_value(items)?,
            delivery_address: serde_json::from_value(delivery_address)?,
            payment_method: PaymentMethod::parse(&payment_method)
                .ok_or_else(|| corrupt("payment method", &payment_method))?,
            payment_status: PaymentStatus::parse(&payment_status)
                .ok_or_else(|| corrupt("payment status", &payment_status))?,
            payment_result: payment_result.map(serde_json::from_value).transpose()?,
            items_price: Money::from_cents(row.try_get("items_price_cents")?),
            tax_price: Money::from_cents(row.try_get("tax_price_cents")?),
            shipping_price: Money::from_cents(row.try_get("shipping_price_cents")?),
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            status: OrderStatus::parse(&status).ok_or_else(|| corrupt("order status", &status))?,
            tracking_number: row.try_get("tracking_number")?,
            delivered_at: row.try_get("delivered_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_notification(row: PgRow) -> Result<Notification> {
        let kind: String = row.try_get("kind")?;
        let related: Option<serde_json::Value> = row.try_get("related")?;
        Ok(Notification {
            id: NotificationId::from_uuid(row.try_get::<Uuid, _>("id")?),
            recipient: UserId::from_uuid(row.try_get::<Uuid, _>("recipient_id")?),
            kind: NotificationKind::parse(&kind)
                .ok_or_else(|| corrupt("notification kind", &kind))?,
            title: row.try_get("title")?,
            message: row.try_get("message")?,
            related: related.map(serde_json::from_value).transpose()?,
            is_read: row.try_get("is_read")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn corrupt(field: &str, value: &str) -> StoreError {
    StoreError::Serialization(serde_json::Error::io(std::io::Error::other(format!(
        "invalid {field}: {value}"
    ))))
}

#[async_trait]
impl MarketStore for PostgresStore {
    async fn next_sequence(&self, name: &str) -> Result<i64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, value) VALUES ($1, 1)
            ON CONFLICT (name)
            DO UPDATE SET value = counters.value + 1, updated_at = now()
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, seller_id, name, description, image_url, price_cents, stock, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.seller.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, image_url = $4, price_cents = $5,
                stock = $6, is_active = $7, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.is_active)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "product" });
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn products_by_seller(&self, seller: UserId) -> Result<Vec<Product>> {
        let rows =
            sqlx::query("SELECT * FROM products WHERE seller_id = $1 ORDER BY created_at DESC")
                .bind(seller.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn add_cart_item(
        &self,
        buyer: UserId,
        product: ProductId,
        quantity: u32,
        price_snapshot: Money,
    ) -> Result<(CartItem, bool)> {
        // xmax = 0 distinguishes a fresh insert from a conflict update.
        let row = sqlx::query(
            r#"
            INSERT INTO cart_items
                (id, buyer_id, product_id, quantity, price_snapshot_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            ON CONFLICT ON CONSTRAINT unique_buyer_product
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = now()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(CartItemId::new().as_uuid())
        .bind(buyer.as_uuid())
        .bind(product.as_uuid())
        .bind(i64::from(quantity))
        .bind(price_snapshot.cents())
        .fetch_one(&self.pool)
        .await?;
        let inserted: bool = row.try_get("inserted")?;
        Ok((Self::row_to_cart_item(row)?, inserted))
    }

    async fn cart_items(&self, buyer: UserId) -> Result<Vec<CartItem>> {
        let rows =
            sqlx::query("SELECT * FROM cart_items WHERE buyer_id = $1 ORDER BY created_at DESC")
                .bind(buyer.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Self::row_to_cart_item).collect()
    }

    async fn set_cart_quantity(
        &self,
        id: CartItemId,
        buyer: UserId,
        quantity: u32,
    ) -> Result<Option<CartItem>> {
        let row = sqlx::query(
            r#"
            UPDATE cart_items SET quantity = $3, updated_at = now()
            WHERE id = $1 AND buyer_id = $2
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(buyer.as_uuid())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_cart_item).transpose()
    }

    async fn remove_cart_item(&self, id: CartItemId, buyer: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND buyer_id = $2")
            .bind(id.as_uuid())
            .bind(buyer.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, order_number, buyer_id, buyer_name, buyer_phone, items, delivery_address,
                 payment_method, payment_status, payment_result, items_price_cents, tax_price_cents,
                 shipping_price_cents, total_price_cents, status, tracking_number, delivered_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.number.value())
        .bind(order.buyer.as_uuid())
        .bind(&order.buyer_name)
        .bind(&order.buyer_phone)
        .bind(serde_json::to_value(&order.items)?)
        .bind(serde_json::to_value(&order.delivery_address)?)
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(
            order
                .payment_result
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .bind(order.items_price.cents())
        .bind(order.tax_price.cents())
        .bind(order.shipping_price.cents())
        .bind(order.total_price.cents())
        .bind(order.status.as_str())
        .bind(&order.tracking_number)
        .bind(order.delivered_at)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_order).transpose()
    }

    async fn orders_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC, order_number DESC",
        )
        .bind(buyer.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn orders_by_seller(&self, seller: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders o
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(o.items) item
                WHERE item->>'seller' = $1
            )
            ORDER BY created_at DESC, order_number DESC
            "#,
        )
        .bind(seller.as_uuid().to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    #[tracing::instrument(skip(self, update), fields(order_id = %id))]
    async fn update_order_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        update: OrderStatusUpdate,
    ) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        // Lock the order row so competing transitions serialize here.
        let row = sqlx::query("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(StoreError::NotFound { entity: "order" });
        };
        let status: String = row.try_get("status")?;
        let actual = OrderStatus::parse(&status).ok_or_else(|| corrupt("order status", &status))?;
        if actual != expected {
            return Err(StoreError::StatusConflict {
                order_id: id,
                expected,
                actual,
            });
        }

        for decrement in &update.decrements {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - $2,
                    is_active = CASE WHEN stock - $2 <= 0 THEN FALSE ELSE is_active END,
                    updated_at = now()
                WHERE id = $1 AND stock >= $2
                "#,
            )
            .bind(decrement.product.as_uuid())
            .bind(i64::from(decrement.quantity))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                        .bind(decrement.product.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await?;
                match available {
                    // Dropping the transaction rolls back earlier decrements.
                    Some(available) => {
                        return Err(StoreError::InsufficientStock {
                            product: decrement.product,
                            available,
                            requested: decrement.quantity,
                        });
                    }
                    // Product row deleted since checkout; nothing to deduct.
                    None => continue,
                }
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2,
                tracking_number = COALESCE($3, tracking_number),
                delivered_at = COALESCE($4, delivered_at),
                payment_result = COALESCE($5, payment_result)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(update.status.as_str())
        .bind(&update.tracking_number)
        .bind(update.delivered_at)
        .bind(
            update
                .payment_result
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .fetch_one(&mut *tx)
        .await?;
        let order = Self::row_to_order(row)?;

        tx.commit().await?;
        Ok(order)
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, recipient_id, kind, title, message, related, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.recipient.as_uuid())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(
            notification
                .related
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn notifications(&self, recipient: UserId, limit: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(recipient.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn unread_count(&self, recipient: UserId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn mark_notification_read(
        &self,
        id: NotificationId,
        recipient: UserId,
    ) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(recipient.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_notification).transpose()
    }

    async fn mark_all_read(&self, recipient: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, id: NotificationId, recipient: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
            .bind(id.as_uuid())
            .bind(recipient.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_notifications(&self, recipient: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE recipient_id = $1")
            .bind(recipient.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
