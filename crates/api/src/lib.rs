//! RPC-style HTTP API for the storefront.
//!
//! Every operation is `POST /<service>/<Method>` with a JSON body. The admin
//! namespace is gated by a bearer token (see [`auth`]). Requests are traced
//! with `tower_http::trace` and counters are exported at `/metrics`.

pub mod auth;
pub mod config;
pub mod deadline;
pub mod error;
pub mod messages;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use domain::{AdminService, OrderService, ProductService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryOrderRepository, InMemoryProductRepository, OrderRepository, ProductRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<P: ProductRepository, O: OrderRepository> {
    pub products: ProductService<P>,
    pub orders: OrderService<O>,
    pub admin: AdminService,
}

impl<P: ProductRepository, O: OrderRepository> AppState<P, O> {
    pub fn new(products: P, orders: O, admin: AdminService) -> Self {
        Self {
            products: ProductService::new(products),
            orders: OrderService::new(orders),
            admin,
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<P, O>(
    state: Arc<AppState<P, O>>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router
where
    P: ProductRepository + 'static,
    O: OrderRepository + 'static,
{
    use routes::{admin, order, product};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let gate = from_fn_with_state(state.admin.clone(), auth::require_admin);

    Router::new()
        .route(
            "/store.product.ProductService/GetProduct",
            post(product::get_product::<P, O>),
        )
        .route(
            "/store.product.ProductService/ListProducts",
            post(product::list_products::<P, O>),
        )
        .route(
            "/store.order.OrderService/CreateOrder",
            post(order::create_order::<P, O>),
        )
        .route(
            "/store.order.OrderService/GetOrder",
            post(order::get_order::<P, O>),
        )
        .route(auth::LOGIN_PATH, post(admin::login::<P, O>))
        .route(
            "/store.admin.AdminService/CreateProduct",
            post(admin::create_product::<P, O>),
        )
        .route(
            "/store.admin.AdminService/DeleteProduct",
            post(admin::delete_product::<P, O>),
        )
        .route(
            "/store.admin.AdminService/ListOrders",
            post(admin::list_orders::<P, O>),
        )
        .route(
            "/store.admin.AdminService/UpdateOrderStatus",
            post(admin::update_order_status::<P, O>),
        )
        .route(
            "/store.admin.AdminService/DeleteOrder",
            post(admin::delete_order::<P, O>),
        )
        .layer(gate)
        .with_state(state)
        .route("/health", get(routes::health::check))
        .merge(metrics_router)
        .layer(from_fn_with_state(
            request_timeout,
            deadline::enforce_deadline,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by the in-memory repositories.
pub fn create_default_state(
    admin: AdminService,
) -> Arc<AppState<InMemoryProductRepository, InMemoryOrderRepository>> {
    Arc::new(AppState::new(
        InMemoryProductRepository::new(),
        InMemoryOrderRepository::new(),
        admin,
    ))
}
