mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use common::{ARTWORK_ID, SOLD_OUT_ID, address_json, paid_order, test_app};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use storefront::infrastructure::in_memory::InMemoryOrderStore;
use tower::ServiceExt;

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn checkout_body(price: u32, quantity: i64) -> Value {
    json!({
        "items": [{
            "id": ARTWORK_ID,
            "title": "Test Artwork",
            "price": price,
            "quantity": quantity,
            "slug": "test-artwork"
        }],
        "customerName": "Ada Lovelace",
        "customerEmail": "Ada@Example.com",
        "shippingAddress": address_json(),
        "sameAsShipping": true,
        "orderNotes": "Please wrap"
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let (status, body) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_validate_valid_cart() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let request = post_json(
        "/checkout/validate",
        json!({"items": [{"id": ARTWORK_ID, "title": "Test Artwork", "price": 50, "quantity": 2}]}),
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    let cart = &body["cart"];
    assert_eq!(cart["isValid"], true);
    assert_eq!(cart["subtotal"], "100.00");
    assert_eq!(cart["shippingCost"], "5.00");
    assert_eq!(cart["taxAmount"], "0.00");
    assert_eq!(cart["total"], "105.00");
    assert_eq!(cart["items"][0]["id"], ARTWORK_ID);
    assert_eq!(cart["errors"], json!([]));
}

#[tokio::test]
async fn test_validate_business_failures_are_ok_responses() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let request = post_json(
        "/checkout/validate",
        json!({"items": [
            {"id": ARTWORK_ID, "title": "Test Artwork", "price": 40, "quantity": 1},
            {"id": SOLD_OUT_ID, "title": "Out of Stock Item", "price": 75, "quantity": 1}
        ]}),
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    let cart = &body["cart"];
    assert_eq!(cart["isValid"], false);
    assert_eq!(cart["total"], "0.00");
    assert_eq!(cart["items"], json!([]));
    assert_eq!(
        cart["errors"],
        json!([
            "Price for \"Test Artwork\" has changed. Please refresh your cart.",
            "Only 0 of \"Out of Stock Item\" available"
        ])
    );
}

#[tokio::test]
async fn test_validate_empty_cart() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let (status, body) = send(app, post_json("/checkout/validate", json!({"items": []}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["errors"], json!(["Cart is empty"]));
}

#[tokio::test]
async fn test_validate_malformed_lines() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let request = post_json(
        "/checkout/validate",
        json!({"items": [{"id": "not-a-uuid", "title": "Print", "price": -1, "quantity": 0}]}),
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid cart data");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|detail| detail["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["items[0].id", "items[0].price", "items[0].quantity"]
    );
}

fn detail_fields(body: &Value) -> Vec<&str> {
    body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|detail| detail["field"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_validate_wrongly_typed_quantities_are_field_errors() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let request = post_json(
        "/checkout/validate",
        json!({"items": [
            {"id": ARTWORK_ID, "title": "Test Artwork", "price": 50, "quantity": 2.5},
            {"id": ARTWORK_ID, "title": "Test Artwork", "price": "abc", "quantity": "2"}
        ]}),
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid cart data");
    assert_eq!(
        detail_fields(&body),
        vec!["items[0].quantity", "items[1].price", "items[1].quantity"]
    );
}

#[tokio::test]
async fn test_validate_wrongly_shaped_body_is_bad_request() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let (status, body) = send(app, post_json("/checkout/validate", json!({"items": null}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid cart data");
    assert_eq!(detail_fields(&body), vec!["items"]);
}

#[tokio::test]
async fn test_validate_unparseable_body() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let request = Request::post("/checkout/validate")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_checkout_authorizes_catalog_total_with_tax() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0.08)).await;
    let (status, body) = send(app, post_json("/checkout", checkout_body(50, 2))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], "105.00");
    assert_eq!(body["taxAmount"], "8.40");
    assert_eq!(body["total"], "113.40");
    assert!(
        body["clientSecret"]
            .as_str()
            .unwrap()
            .contains("_secret_")
    );
}

#[tokio::test]
async fn test_checkout_rejects_stale_cart() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let (status, body) = send(app, post_json("/checkout", checkout_body(1, 2))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart validation failed");
    assert_eq!(
        body["details"],
        json!(["Price for \"Test Artwork\" has changed. Please refresh your cart."])
    );
    assert_eq!(body["cart"]["isValid"], false);
    assert_eq!(body["cart"]["total"], "0.00");
}

#[tokio::test]
async fn test_checkout_rejects_structurally_invalid_request() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let mut body = checkout_body(50, 1);
    body["customerEmail"] = json!("not-an-email");
    body["shippingAddress"]["country"] = json!("USA");

    let (status, body) = send(app, post_json("/checkout", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid checkout data");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|detail| detail["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"customerEmail"));
    assert!(fields.contains(&"shippingAddress.country"));
}

#[tokio::test]
async fn test_checkout_non_integer_quantity_is_bad_request() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let mut body = checkout_body(50, 1);
    body["items"][0]["quantity"] = json!(2.5);

    let (status, body) = send(app, post_json("/checkout", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid checkout data");
    assert_eq!(detail_fields(&body), vec!["items[0].quantity"]);
}

#[tokio::test]
async fn test_checkout_string_quantity_is_bad_request() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let mut body = checkout_body(50, 1);
    body["items"][0]["quantity"] = json!("2");

    let (status, body) = send(app, post_json("/checkout", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid checkout data");
    assert_eq!(detail_fields(&body), vec!["items[0].quantity"]);
}

#[tokio::test]
async fn test_checkout_wrongly_typed_field_is_bad_request() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let mut body = checkout_body(50, 1);
    body["customerName"] = json!(42);

    let (status, body) = send(app, post_json("/checkout", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid checkout data");
    assert_eq!(detail_fields(&body), vec!["customerName"]);
}

#[tokio::test]
async fn test_checkout_unparseable_body() {
    let app = test_app(InMemoryOrderStore::new(), dec!(0)).await;
    let request = Request::post("/checkout")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("[1, 2"))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to create payment intent"}));
}

#[tokio::test]
async fn test_order_by_session() {
    let orders = InMemoryOrderStore::new();
    orders.insert(paid_order("cs_test_paid")).await;
    let app = test_app(orders, dec!(0)).await;

    let (status, body) = send(
        app.clone(),
        Request::get("/checkout/session/cs_test_paid")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["sessionId"], "cs_test_paid");
    assert_eq!(body["order"]["status"], "paid");
    assert_eq!(body["order"]["total"], "105.00");

    let (status, body) = send(
        app,
        Request::get("/checkout/session/cs_test_missing")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Order not found"}));
}
