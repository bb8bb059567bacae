//! Integration tests for the API server.
//!
//! The router runs over the in-memory repositories and is driven with
//! `tower::ServiceExt::oneshot`, one request per call.

use std::sync::OnceLock;
use std::time::Duration;

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{AdminClaims, AdminCredentials, AdminService, DEFAULT_TOKEN_TTL};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "correct horse battery staple";
const SECRET: &str = "integration-secret";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static PASSWORD_HASH: OnceLock<String> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn admin_service() -> AdminService {
    let hash = PASSWORD_HASH.get_or_init(|| {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
            .unwrap()
            .to_string()
    });
    AdminService::new(AdminCredentials {
        username: ADMIN_USER.to_string(),
        password_hash: hash.clone(),
        token_secret: SECRET.to_string(),
        token_ttl: DEFAULT_TOKEN_TTL,
    })
    .unwrap()
}

fn setup() -> Router {
    let state = api::create_default_state(admin_service());
    api::create_app(state, get_metrics_handle(), Duration::from_secs(30))
}

async fn call(app: &Router, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router) -> String {
    let (status, body) = call(
        app,
        "/store.admin.AdminService/Login",
        None,
        json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, name: &str, price: i64) -> String {
    let (status, body) = call(
        app,
        "/store.admin.AdminService/CreateProduct",
        Some(token),
        json!({ "name": name, "description": format!("{name} description"), "price": price }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_str().unwrap().to_string()
}

fn forged_token(secret: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = AdminClaims {
        sub: ADMIN_USER.to_string(),
        iat: now as usize,
        exp: (now + exp_offset_secs) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn slow_call_past_deadline_is_internal() {
    let state = api::create_default_state(admin_service());
    let app = api::create_app(state, get_metrics_handle(), Duration::from_millis(1));

    // Argon2 verification alone takes well over a millisecond.
    let (status, body) = call(
        &app,
        "/store.admin.AdminService/Login",
        None,
        json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL");
    assert!(body["message"].as_str().unwrap().contains("deadline exceeded"));
}

mod gate {
    use super::*;

    #[tokio::test]
    async fn login_then_gated_call_succeeds() {
        let app = setup();
        let token = login(&app).await;

        let (status, body) = call(
            &app,
            "/store.admin.AdminService/ListOrders",
            Some(&token),
            json!({ "limit": 10, "offset": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["orders"], json!([]));
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let app = setup();

        let (status, body) = call(
            &app,
            "/store.admin.AdminService/CreateProduct",
            None,
            json!({ "name": "Lamp", "price": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn malformed_header_is_unauthenticated() {
        let app = setup();
        let token = login(&app).await;

        let request = Request::builder()
            .method("POST")
            .uri("/store.admin.AdminService/ListOrders")
            .header("content-type", "application/json")
            .header("authorization", token)
            .body(Body::from(json!({ "limit": 1 }).to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn foreign_and_expired_tokens_are_rejected() {
        let app = setup();

        for token in [
            forged_token("someone-else", 3600),
            forged_token(SECRET, -60),
            "not-a-jwt".to_string(),
        ] {
            let (status, _) = call(
                &app,
                "/store.admin.AdminService/DeleteOrder",
                Some(&token),
                json!({ "id": uuid::Uuid::new_v4().to_string() }),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{token}");
        }
    }

    #[tokio::test]
    async fn token_signed_with_configured_secret_is_accepted() {
        let app = setup();

        let (status, _) = call(
            &app,
            "/store.admin.AdminService/ListOrders",
            Some(&forged_token(SECRET, 3600)),
            json!({ "limit": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejected_call_has_no_effect() {
        let app = setup();

        let (status, _) = call(
            &app,
            "/store.admin.AdminService/CreateProduct",
            Some("garbage"),
            json!({ "name": "Lamp", "price": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, body) = call(
            &app,
            "/store.product.ProductService/ListProducts",
            None,
            json!({ "limit": 10 }),
        )
        .await;
        assert_eq!(body["products"], json!([]));
    }

    #[tokio::test]
    async fn wrong_username_and_password_are_indistinguishable() {
        let app = setup();

        let (user_status, user_body) = call(
            &app,
            "/store.admin.AdminService/Login",
            None,
            json!({ "username": "root", "password": ADMIN_PASSWORD }),
        )
        .await;
        let (pass_status, pass_body) = call(
            &app,
            "/store.admin.AdminService/Login",
            None,
            json!({ "username": ADMIN_USER, "password": "wrong" }),
        )
        .await;

        assert_eq!(user_status, StatusCode::UNAUTHORIZED);
        assert_eq!(user_status, pass_status);
        assert_eq!(user_body, pass_body);
    }

    #[tokio::test]
    async fn public_services_need_no_token() {
        let app = setup();

        let (status, _) = call(
            &app,
            "/store.product.ProductService/ListProducts",
            None,
            json!({ "limit": 5, "offset": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod products {
    use super::*;

    #[tokio::test]
    async fn create_get_list_delete() {
        let app = setup();
        let token = login(&app).await;

        for name in ["Chair", "Amp", "Bench"] {
            create_product(&app, &token, name, 1200).await;
        }
        let lamp = create_product(&app, &token, "Lamp", 4500).await;

        let (status, body) = call(
            &app,
            "/store.product.ProductService/GetProduct",
            None,
            json!({ "id": lamp }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["name"], "Lamp");
        assert_eq!(body["product"]["price"], 4500);
        assert_eq!(body["product"]["description"], "Lamp description");

        let (_, body) = call(
            &app,
            "/store.product.ProductService/ListProducts",
            None,
            json!({ "limit": 2, "offset": 1 }),
        )
        .await;
        let names: Vec<&str> = body["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Bench", "Chair"]);

        let (status, body) = call(
            &app,
            "/store.admin.AdminService/DeleteProduct",
            Some(&token),
            json!({ "id": lamp }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, body) = call(
            &app,
            "/store.product.ProductService/GetProduct",
            None,
            json!({ "id": lamp }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let app = setup();
        let token = login(&app).await;

        let (status, body) = call(
            &app,
            "/store.admin.AdminService/CreateProduct",
            Some(&token),
            json!({ "name": "Lamp", "price": -1 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, _) = call(
            &app,
            "/store.product.ProductService/GetProduct",
            None,
            json!({ "id": "not-a-uuid" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "/store.product.ProductService/ListProducts",
            None,
            json!({ "limit": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "/store.product.ProductService/ListProducts",
            None,
            json!({ "limit": "ten" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod orders {
    use super::*;

    async fn create_order(app: &Router, items: Value) -> (StatusCode, Value) {
        call(
            app,
            "/store.order.OrderService/CreateOrder",
            None,
            json!({
                "customer_name": "Grace Hopper",
                "customer_email": "grace@example.com",
                "items": items,
            }),
        )
        .await
    }

    #[tokio::test]
    async fn create_then_get() {
        let app = setup();
        let product = uuid::Uuid::new_v4().to_string();

        let (status, body) = create_order(
            &app,
            json!([{ "product_id": product, "quantity": 2 }]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "/store.order.OrderService/GetOrder",
            None,
            json!({ "id": id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let order = &body["order"];
        assert_eq!(order["id"], id);
        assert_eq!(order["customer_name"], "Grace Hopper");
        assert_eq!(order["status"], "ORDER_STATUS_UNSPECIFIED");
        assert_eq!(order["items"], json!([{ "product_id": product, "quantity": 2 }]));
        assert!(order["created_at"]["seconds"].as_i64().unwrap() > 0);
        assert!(order["updated_at"]["nanos"].is_number());
    }

    #[tokio::test]
    async fn invalid_orders_are_rejected() {
        let app = setup();

        let (status, _) = create_order(
            &app,
            json!([{ "product_id": uuid::Uuid::new_v4().to_string(), "quantity": 0 }]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "/store.order.OrderService/CreateOrder",
            None,
            json!({ "customer_name": "Grace", "customer_email": "not-an-email", "items": [] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_customer_fields_are_invalid_arguments() {
        let app = setup();
        let long_email = format!("{}@example.com", "y".repeat(300));

        for (name, email) in [
            ("x".repeat(300), "grace@example.com".to_string()),
            ("Grace".to_string(), long_email),
        ] {
            let (status, body) = call(
                &app,
                "/store.order.OrderService/CreateOrder",
                None,
                json!({ "customer_name": name, "customer_email": email, "items": [] }),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "INVALID_ARGUMENT");
        }

        let token = login(&app).await;
        let (_, body) = call(
            &app,
            "/store.admin.AdminService/ListOrders",
            Some(&token),
            json!({ "limit": 10 }),
        )
        .await;
        assert_eq!(body["orders"], json!([]));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let app = setup();
        let token = login(&app).await;
        let missing = uuid::Uuid::new_v4().to_string();

        let (status, _) = call(
            &app,
            "/store.order.OrderService/GetOrder",
            None,
            json!({ "id": missing }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            "/store.admin.AdminService/UpdateOrderStatus",
            Some(&token),
            json!({ "id": missing, "status": "ORDER_STATUS_PENDING" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_manages_orders() {
        let app = setup();
        let token = login(&app).await;

        let (_, body) = create_order(&app, json!([])).await;
        let first = body["id"].as_str().unwrap().to_string();
        let (_, body) = create_order(
            &app,
            json!([{ "product_id": uuid::Uuid::new_v4().to_string(), "quantity": 1 }]),
        )
        .await;
        let second = body["id"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            "/store.admin.AdminService/UpdateOrderStatus",
            Some(&token),
            json!({ "id": first, "status": "ORDER_STATUS_COMPLETED" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(
            &app,
            "/store.admin.AdminService/ListOrders",
            Some(&token),
            json!({ "limit": 10, "offset": 0 }),
        )
        .await;
        let orders = body["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 2);
        let listed_first = orders.iter().find(|o| o["id"] == first.as_str()).unwrap();
        assert_eq!(listed_first["status"], "ORDER_STATUS_COMPLETED");
        let listed_second = orders.iter().find(|o| o["id"] == second.as_str()).unwrap();
        assert_eq!(listed_second["items"].as_array().unwrap().len(), 1);

        let (status, _) = call(
            &app,
            "/store.admin.AdminService/DeleteOrder",
            Some(&token),
            json!({ "id": second }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            "/store.order.OrderService/GetOrder",
            None,
            json!({ "id": second }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
