use async_trait::async_trait;
use common::{
    NewOrder, NewProduct, Order, OrderId, OrderItem, OrderStatus, Page, Product, ProductId,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    OrderRepository, ProductRepository, Result, StoreError, batch::attach_children,
};

/// Runs the database migrations shipped in the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Maps a failed write to a store error, surfacing check constraint
/// violations by name.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_check_violation()
        && let Some(constraint) = db_err.constraint()
    {
        return StoreError::ConstraintViolation {
            constraint: constraint.to_string(),
        };
    }
    StoreError::Database(e)
}

fn decode_status(raw: i16) -> std::result::Result<OrderStatus, sqlx::Error> {
    OrderStatus::try_from(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// PostgreSQL-backed product repository.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
        })
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: &NewProduct) -> Result<ProductId> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO product (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        tracing::debug!(product_id = %id, "inserted product");
        Ok(ProductId::from_uuid(id))
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Product> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, name, description, price
            FROM product
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_product(row),
            None => Err(StoreError::not_found("product", id)),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", id));
        }
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price
            FROM product
            ORDER BY name ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }
}

/// PostgreSQL-backed order repository.
///
/// Orders span two tables (`orders` and `order_item`); every operation that
/// touches both runs inside one transaction. An uncommitted transaction is
/// rolled back when dropped, so early returns and cancelled futures leave
/// nothing behind.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_header(row: &PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
            items: Vec::new(),
            status: decode_status(row.try_get("status")?)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: row.try_get("quantity")?,
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<OrderId> {
        let mut tx = self.pool.begin().await?;

        let order_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_name, customer_email, status)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.status.as_i16())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_item (order_id, product_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id.as_uuid())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;

        tracing::debug!(
            order_id = %order_id,
            item_count = order.items.len(),
            "inserted order"
        );
        Ok(OrderId::from_uuid(order_id))
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, customer_name, customer_email, status, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::not_found("order", id));
        };
        let mut order = Self::row_to_header(&row)?;

        let item_rows = sqlx::query(
            r#"
            SELECT product_id, quantity
            FROM order_item
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        order.items = item_rows
            .iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        tx.commit().await?;
        Ok(order)
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(status.as_i16())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order", id));
        }
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order", id));
        }
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<Order>> {
        let mut tx = self.pool.begin().await?;

        let header_rows = sqlx::query(
            r#"
            SELECT id, customer_name, customer_email, status, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *tx)
        .await?;

        let mut orders = header_rows
            .iter()
            .map(Self::row_to_header)
            .collect::<Result<Vec<_>>>()?;

        if !orders.is_empty() {
            let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();

            let item_rows = sqlx::query(
                r#"
                SELECT order_id, product_id, quantity
                FROM order_item
                WHERE order_id = ANY($1)
                ORDER BY id ASC
                "#,
            )
            .bind(&order_ids)
            .fetch_all(&mut *tx)
            .await?;

            let items = item_rows
                .iter()
                .map(|row| -> Result<(OrderId, OrderItem)> {
                    let order_id = OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?);
                    Ok((order_id, Self::row_to_item(row)?))
                })
                .collect::<Result<Vec<_>>>()?;

            attach_children(&mut orders, items, |o| o.id, |o, item| o.items.push(item));
        }

        tx.commit().await?;
        Ok(orders)
    }
}
