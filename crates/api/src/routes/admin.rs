//! `store.admin.AdminService` handlers.
//!
//! Everything except `login` sits behind [`crate::auth::require_admin`],
//! which leaves the verified [`AdminClaims`] in the request extensions.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use domain::AdminClaims;
use store::{OrderRepository, ProductRepository};

use super::decode;
use crate::AppState;
use crate::error::ApiError;
use crate::messages::{
    CreateProductRequest, CreateProductResponse, DeleteOrderRequest, DeleteProductRequest, Empty,
    ListOrdersRequest, ListOrdersResponse, LoginRequest, LoginResponse, OrderMessage,
    UpdateOrderStatusRequest,
};

/// POST /store.admin.AdminService/Login
#[tracing::instrument(skip_all)]
pub async fn login<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let req = decode(payload)?;
    let token = state.admin.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

/// POST /store.admin.AdminService/CreateProduct
#[tracing::instrument(skip_all, fields(admin = %claims.sub))]
pub async fn create_product<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Extension(claims): Extension<AdminClaims>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Json<CreateProductResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let product = decode(payload)?;
    let id = state
        .products
        .create(&product.name, &product.description, product.price)
        .await?;

    Ok(Json(CreateProductResponse { id: id.to_string() }))
}

/// POST /store.admin.AdminService/DeleteProduct
#[tracing::instrument(skip_all, fields(admin = %claims.sub))]
pub async fn delete_product<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Extension(claims): Extension<AdminClaims>,
    payload: Result<Json<DeleteProductRequest>, JsonRejection>,
) -> Result<Json<Empty>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let id = decode(payload)?;
    state.products.delete(id).await?;
    Ok(Json(Empty {}))
}

/// POST /store.admin.AdminService/ListOrders
#[tracing::instrument(skip_all, fields(admin = %claims.sub))]
pub async fn list_orders<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Extension(claims): Extension<AdminClaims>,
    payload: Result<Json<ListOrdersRequest>, JsonRejection>,
) -> Result<Json<ListOrdersResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let page = decode(payload)?;
    let orders = state.orders.list(page).await?;

    Ok(Json(ListOrdersResponse {
        orders: orders.iter().map(OrderMessage::from).collect(),
    }))
}

/// POST /store.admin.AdminService/UpdateOrderStatus
#[tracing::instrument(skip_all, fields(admin = %claims.sub))]
pub async fn update_order_status<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Extension(claims): Extension<AdminClaims>,
    payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<Empty>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let (id, status) = decode(payload)?;
    state.orders.update_status(id, status).await?;
    Ok(Json(Empty {}))
}

/// POST /store.admin.AdminService/DeleteOrder
#[tracing::instrument(skip_all, fields(admin = %claims.sub))]
pub async fn delete_order<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Extension(claims): Extension<AdminClaims>,
    payload: Result<Json<DeleteOrderRequest>, JsonRejection>,
) -> Result<Json<Empty>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let id = decode(payload)?;
    state.orders.delete(id).await?;
    Ok(Json(Empty {}))
}
