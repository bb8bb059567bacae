//! `store.order.OrderService` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use store::{OrderRepository, ProductRepository};

use super::decode;
use crate::AppState;
use crate::error::ApiError;
use crate::messages::{
    CreateOrderRequest, CreateOrderResponse, GetOrderRequest, GetOrderResponse, OrderMessage,
};

/// POST /store.order.OrderService/CreateOrder
///
/// Product ids are not checked against the catalog.
#[tracing::instrument(skip_all)]
pub async fn create_order<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let order = decode(payload)?;
    let id = state
        .orders
        .create(&order.customer_name, &order.customer_email, order.items)
        .await?;

    Ok(Json(CreateOrderResponse { id: id.to_string() }))
}

/// POST /store.order.OrderService/GetOrder
#[tracing::instrument(skip_all)]
pub async fn get_order<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    payload: Result<Json<GetOrderRequest>, JsonRejection>,
) -> Result<Json<GetOrderResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let id = decode(payload)?;
    let order = state.orders.get(id).await?;

    Ok(Json(GetOrderResponse {
        order: OrderMessage::from(&order),
    }))
}
