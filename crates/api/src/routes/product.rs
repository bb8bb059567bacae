//! `store.product.ProductService` handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use store::{OrderRepository, ProductRepository};

use super::decode;
use crate::AppState;
use crate::error::ApiError;
use crate::messages::{
    GetProductRequest, GetProductResponse, ListProductsRequest, ListProductsResponse,
    ProductMessage,
};

/// POST /store.product.ProductService/GetProduct
#[tracing::instrument(skip_all)]
pub async fn get_product<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    payload: Result<Json<GetProductRequest>, JsonRejection>,
) -> Result<Json<GetProductResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let id = decode(payload)?;
    let product = state.products.get(id).await?;

    Ok(Json(GetProductResponse {
        product: ProductMessage::from(&product),
    }))
}

/// POST /store.product.ProductService/ListProducts
#[tracing::instrument(skip_all)]
pub async fn list_products<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    payload: Result<Json<ListProductsRequest>, JsonRejection>,
) -> Result<Json<ListProductsResponse>, ApiError>
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    let page = decode(payload)?;
    let products = state.products.list(page).await?;

    Ok(Json(ListProductsResponse {
        products: products.iter().map(ProductMessage::from).collect(),
    }))
}
