//! End-to-end HTTP flow through the axum router

use axum::Router;
use axum::body::Body;
use delivery_server::{Config, JwtService, ServerState, api, db};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::{Extra, Product, SizeVariant};
use tower::ServiceExt;

fn test_state() -> ServerState {
    let config = Config::with_work_dir("unused");
    let state = ServerState::with_database(&config, db::open_in_memory().unwrap()).unwrap();
    let pizzas = [
        (1, "Margherita", [33.0, 43.0, 53.0]),
        (2, "Calabresa", [35.0, 45.0, 55.0]),
    ];
    for (id, name, prices) in pizzas {
        state
            .catalog
            .upsert_product(Product {
                id,
                name: name.into(),
                price: None,
                discount_percent: 0.0,
                allows_half_half: true,
                category_id: 1,
                sizes: ["P", "M", "G"]
                    .iter()
                    .zip(prices)
                    .enumerate()
                    .map(|(i, (size, price))| SizeVariant {
                        id: id * 10 + i as i64,
                        name: size.to_string(),
                        price,
                    })
                    .collect(),
                extras: vec![],
                is_active: true,
            })
            .unwrap();
    }
    state
        .catalog
        .upsert_product(Product {
            id: 3,
            name: "X-Burger".into(),
            price: Some(18.0),
            discount_percent: 0.0,
            allows_half_half: false,
            category_id: 2,
            sizes: vec![],
            extras: vec![Extra {
                id: 31,
                name: "Bacon".into(),
                price: 6.0,
            }],
            is_active: true,
        })
        .unwrap();
    state
}

fn token(state: &ServerState, role: &str) -> String {
    let jwt = JwtService::with_config(state.config.jwt.clone());
    jwt.generate_token("99", role).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn submission() -> Value {
    json!({
        "customer": { "guestName": "Ana", "guestPhone": "11999990000" },
        "deliveryAddress": {
            "street": "Rua Augusta",
            "number": "1200",
            "neighborhood": "Consolação",
            "city": "São Paulo"
        },
        "paymentMethod": "CASH",
        "cashChangeRequested": true,
        "cashChangeFor": 200.0,
        "items": [
            { "productId": 1, "sizeId": 11, "secondFlavorProductId": 2, "quantity": 1 },
            { "productId": 3, "extras": [{ "extraId": 31, "quantity": 1 }], "quantity": 2 }
        ],
        "deliveryFee": 7.0
    })
}

#[tokio::test]
async fn test_health() {
    let app = api::build_app(test_state());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["subscribers"], 0);
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() {
    let app = api::build_app(test_state());

    let generated = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let id = generated.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok(), "{id}");

    let echoed = app
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "dispatch-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(echoed.headers()["x-request-id"], "dispatch-42");
}

#[tokio::test]
async fn test_quote_then_submit_then_track() {
    let state = test_state();
    let app = api::build_app(state.clone());
    let mut rx = state.bus.subscribe();

    let (status, quote) = send(
        &app,
        "POST",
        "/api/cart/quote",
        None,
        Some(json!({ "items": submission()["items"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["data"]["itemsTotal"], 93.0);
    assert_eq!(quote["data"]["lines"][0]["unitPrice"], 45.0);

    let (status, created) = send(&app, "POST", "/api/orders", None, Some(submission())).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let order = &created["data"];
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["total"], 100.0);
    assert_eq!(order["cashChangeFor"], 200.0);
    assert!(order["orderNumber"].as_str().unwrap().ends_with("-001"));
    assert_eq!(order["lines"][0]["secondFlavor"]["productName"], "Calabresa");

    let event = rx.try_recv().unwrap();
    assert_eq!(serde_json::to_value(&event.payload).unwrap(), *order);

    let id = order["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/orders/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"], *order);
}

#[tokio::test]
async fn test_submission_errors_carry_codes() {
    let app = api::build_app(test_state());

    let mut unknown = submission();
    unknown["items"] = json!([{ "productId": 404, "quantity": 1 }]);
    let (status, body) = send(&app, "POST", "/api/orders", None, Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
    assert_eq!(body["details"]["line"], 1);

    let mut unmatched = submission();
    unmatched["items"] = json!([{ "productId": 1, "quantity": 1 }]);
    let (status, body) = send(&app, "POST", "/api/orders", None, Some(unmatched)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 6202);

    let mut short_change = submission();
    short_change["cashChangeFor"] = json!(50.0);
    let (status, body) = send(&app, "POST", "/api/orders", None, Some(short_change)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5010);

    let mut anonymous = submission();
    anonymous["customer"] = json!({});
    let (status, body) = send(&app, "POST", "/api/orders", None, Some(anonymous)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4021);
}

#[tokio::test]
async fn test_staff_endpoints_require_staff_token() {
    let state = test_state();
    let app = api::build_app(state.clone());
    let staff = token(&state, "staff");
    let customer = token(&state, "customer");

    let (status, _) = send(&app, "GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2002);

    let (status, _) = send(&app, "GET", "/api/orders", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/orders", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_lifecycle_over_http() {
    let state = test_state();
    let app = api::build_app(state.clone());
    let staff = token(&state, "admin");

    let (_, created) = send(&app, "POST", "/api/orders", None, Some(submission())).await;
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/orders/{id}/transition");

    let (status, _) = send(&app, "POST", &uri, None, Some(json!({ "action": "advance" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let advance = json!({ "action": "advance", "expectedStatus": "PENDING" });
    let (status, body) = send(&app, "POST", &uri, Some(&staff), Some(advance.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["order"]["status"], "IN_PREPARATION");
    assert_eq!(body["data"]["availableActions"], json!(["advance", "cancel"]));

    // double click
    let (status, body) = send(&app, "POST", &uri, Some(&staff), Some(advance)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4011);

    let (status, _) = send(&app, "POST", &uri, Some(&staff), Some(json!({ "action": "purge" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", &uri, Some(&staff), Some(json!({ "action": "cancel" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", &uri, Some(&staff), Some(json!({ "action": "purge" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["purged"], true);

    let (status, body) = send(&app, "GET", &format!("/api/orders/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn test_menu_is_public() {
    let app = api::build_app(test_state());

    let (status, body) = send(&app, "GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, "GET", "/api/products/3", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "X-Burger");

    let (status, body) = send(&app, "GET", "/api/products/77", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}
