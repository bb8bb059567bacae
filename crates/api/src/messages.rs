//! Wire messages for the RPC surface.
//!
//! Request messages follow proto3 conventions: every field is optional on the
//! wire and falls back to its zero value, so a missing field surfaces as a
//! validation failure rather than a decode failure. Each request validates
//! into the typed values the use-cases take.

use chrono::{DateTime, Utc};
use common::{NewProduct, Order, OrderId, OrderItem, OrderStatus, Page, Product, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page a list call may request.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Longest product name the catalog accepts.
pub const MAX_PRODUCT_NAME_LEN: usize = 255;

/// Longest customer name or email an order accepts.
pub const MAX_CUSTOMER_FIELD_LEN: usize = 255;

/// A request field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Checks a decoded request and converts it into use-case arguments.
pub trait Validate {
    type Validated;

    fn validate(self) -> Result<Self::Validated, ValidationError>;
}

fn parse_id<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "required"));
    }
    value
        .parse()
        .map_err(|_| ValidationError::new(field, "not a valid UUID"))
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "required"));
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn page(limit: i64, offset: i64) -> Result<Page, ValidationError> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ValidationError::new(
            "limit",
            format!("must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    if offset < 0 {
        return Err(ValidationError::new("offset", "must not be negative"));
    }
    Ok(Page::new(limit, offset))
}

/// Accepts `local@domain` where the domain has at least one dot.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

// -- Shared messages --

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanos: at.timestamp_subsec_nanos() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatusMessage {
    #[default]
    #[serde(rename = "ORDER_STATUS_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "ORDER_STATUS_PENDING")]
    Pending,
    #[serde(rename = "ORDER_STATUS_PROCESSING")]
    Processing,
    #[serde(rename = "ORDER_STATUS_COMPLETED")]
    Completed,
    #[serde(rename = "ORDER_STATUS_CANCELLED")]
    Cancelled,
}

impl From<OrderStatus> for OrderStatusMessage {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Unspecified => Self::Unspecified,
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Processing => Self::Processing,
            OrderStatus::Completed => Self::Completed,
            OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<OrderStatusMessage> for OrderStatus {
    fn from(status: OrderStatusMessage) -> Self {
        match status {
            OrderStatusMessage::Unspecified => Self::Unspecified,
            OrderStatusMessage::Pending => Self::Pending,
            OrderStatusMessage::Processing => Self::Processing,
            OrderStatusMessage::Completed => Self::Completed,
            OrderStatusMessage::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMessage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
}

impl From<&Product> for ProductMessage {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItemMessage {
    pub product_id: String,
    pub quantity: i32,
}

impl From<&OrderItem> for OrderItemMessage {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMessage {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItemMessage>,
    pub status: OrderStatusMessage,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Order> for OrderMessage {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            items: order.items.iter().map(OrderItemMessage::from).collect(),
            status: order.status.into(),
            created_at: order.created_at.into(),
            updated_at: order.updated_at.into(),
        }
    }
}

// -- ProductService --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetProductRequest {
    pub id: String,
}

impl Validate for GetProductRequest {
    type Validated = ProductId;

    fn validate(self) -> Result<ProductId, ValidationError> {
        parse_id("id", &self.id)
    }
}

#[derive(Debug, Serialize)]
pub struct GetProductResponse {
    pub product: ProductMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListProductsRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Validate for ListProductsRequest {
    type Validated = Page;

    fn validate(self) -> Result<Page, ValidationError> {
        page(self.limit, self.offset)
    }
}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Vec<ProductMessage>,
}

// -- OrderService --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItemMessage>,
}

/// A checked `CreateOrder` call.
#[derive(Debug)]
pub struct ValidCreateOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItem>,
}

impl Validate for CreateOrderRequest {
    type Validated = ValidCreateOrder;

    fn validate(self) -> Result<ValidCreateOrder, ValidationError> {
        require("customer_name", &self.customer_name)?;
        max_len("customer_name", &self.customer_name, MAX_CUSTOMER_FIELD_LEN)?;
        max_len("customer_email", &self.customer_email, MAX_CUSTOMER_FIELD_LEN)?;
        if !is_email(&self.customer_email) {
            return Err(ValidationError::new(
                "customer_email",
                "must be of the form local@domain",
            ));
        }

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let product_id = parse_id(&format!("items[{i}].product_id"), &item.product_id)?;
                if item.quantity <= 0 {
                    return Err(ValidationError::new(
                        format!("items[{i}].quantity"),
                        "must be positive",
                    ));
                }
                Ok(OrderItem::new(product_id, item.quantity))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidCreateOrder {
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            items,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GetOrderRequest {
    pub id: String,
}

impl Validate for GetOrderRequest {
    type Validated = OrderId;

    fn validate(self) -> Result<OrderId, ValidationError> {
        parse_id("id", &self.id)
    }
}

#[derive(Debug, Serialize)]
pub struct GetOrderResponse {
    pub order: OrderMessage,
}

// -- AdminService --

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Validate for LoginRequest {
    type Validated = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        require("username", &self.username)?;
        if self.password.is_empty() {
            return Err(ValidationError::new("password", "required"));
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
}

impl Validate for CreateProductRequest {
    type Validated = NewProduct;

    fn validate(self) -> Result<NewProduct, ValidationError> {
        require("name", &self.name)?;
        max_len("name", &self.name, MAX_PRODUCT_NAME_LEN)?;
        if self.price < 0 {
            return Err(ValidationError::new("price", "must not be negative"));
        }
        Ok(NewProduct::new(self.name, self.description, self.price))
    }
}

#[derive(Debug, Serialize)]
pub struct CreateProductResponse {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteProductRequest {
    pub id: String,
}

impl Validate for DeleteProductRequest {
    type Validated = ProductId;

    fn validate(self) -> Result<ProductId, ValidationError> {
        parse_id("id", &self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListOrdersRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Validate for ListOrdersRequest {
    type Validated = Page;

    fn validate(self) -> Result<Page, ValidationError> {
        page(self.limit, self.offset)
    }
}

#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOrderStatusRequest {
    pub id: String,
    pub status: OrderStatusMessage,
}

impl Validate for UpdateOrderStatusRequest {
    type Validated = (OrderId, OrderStatus);

    fn validate(self) -> Result<(OrderId, OrderStatus), ValidationError> {
        Ok((parse_id("id", &self.id)?, self.status.into()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteOrderRequest {
    pub id: String,
}

impl Validate for DeleteOrderRequest {
    type Validated = OrderId;

    fn validate(self) -> Result<OrderId, ValidationError> {
        parse_id("id", &self.id)
    }
}

/// Response of calls that return nothing; serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}
