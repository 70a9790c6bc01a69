use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;

use fill_estimator::{api::router, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app() -> Router {
    router(AppState::new())
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_estimate(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/estimate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn full_fill_body() -> Value {
    json!({
        "pair": "BTC-USD",
        "order": { "side": "Buy", "order_type": "Limit", "price": 100.0, "size": 10.0 },
        "book": [{ "price": 90.0, "amount": 20.0, "side": "Sell" }],
        "current_price": 100.0,
        "market": {
            "volatility": 0.1,
            "volume_24h": 5_000_000.0,
            "spread": 0.1,
            "liquidity_depth": 1000.0
        }
    })
}

#[tokio::test]
async fn estimate_full_fill_returns_fast_window() {
    let app = test_app();

    let res = app.oneshot(post_estimate(&full_fill_body())).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    assert_eq!(v["estimate"]["estimated_time"], "1-3 min");
    assert_eq!(v["estimate"]["confidence"], "high");
    assert!((v["estimate"]["slippage_estimate"].as_f64().unwrap() - 0.01).abs() < 1e-9);
    assert!(v["explanation"].as_str().unwrap().contains("1-3 min"));
    assert!(v["id"].as_str().is_some());
}

#[tokio::test]
async fn estimate_market_order_is_immediate() {
    let app = test_app();

    let body = json!({
        "pair": "ETH-USD",
        "order": { "side": "Sell", "order_type": "Market", "price": 1.0, "size": 3.0 },
        "book": [],
        "current_price": 2000.0
    });
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    assert_eq!(v["estimate"]["estimated_time"], "Immediate");
    assert_eq!(v["estimate"]["confidence"], "high");
}

#[tokio::test]
async fn estimate_empty_book_returns_unknown() {
    let app = test_app();

    let body = json!({
        "pair": "BTC-USD",
        "order": { "side": "Buy", "order_type": "Limit", "price": 100.0, "size": 10.0 },
        "book": [],
        "current_price": 100.0
    });
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    assert_eq!(v["estimate"]["estimated_time"], "Unknown");
    assert_eq!(v["estimate"]["reason"], "No matching orders in order book");
}

#[tokio::test]
async fn estimate_derives_conditions_when_market_absent() {
    let app = test_app();

    let body = json!({
        "pair": "BTC-USD",
        "order": { "side": "Buy", "order_type": "Limit", "price": 100.5, "size": 1.0 },
        "book": [
            { "price": 99.5, "amount": 5.0, "side": "Buy" },
            { "price": 100.5, "amount": 5.0, "side": "Sell" }
        ],
        "current_price": 100.0
    });
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    // spread = (100.5 - 99.5) / 100 * 100 = 1%
    assert!((v["market"]["spread"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert!((v["market"]["liquidity_depth"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    // no tape was supplied, so the 24h volume is zero and the window slows
    assert_eq!(v["estimate"]["estimated_time"], "3-8 min");
    assert!(
        v["estimate"]["reason"]
            .as_str()
            .unwrap()
            .ends_with(", low market volume")
    );
}

#[tokio::test]
async fn estimate_low_volume_market_slows_the_window() {
    let app = test_app();

    let mut body = full_fill_body();
    body["market"]["volume_24h"] = json!(500_000.0);
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    assert_eq!(v["estimate"]["estimated_time"], "3-8 min");
    assert!(
        v["estimate"]["reason"]
            .as_str()
            .unwrap()
            .ends_with(", low market volume")
    );
}

#[tokio::test]
async fn estimate_rejects_zero_size() {
    let app = test_app();

    let mut body = full_fill_body();
    body["order"]["size"] = json!(0.0);
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let v = body_json(res).await;
    assert_eq!(v["error"], "size must be > 0");
}

#[tokio::test]
async fn estimate_rejects_nonpositive_current_price() {
    let app = test_app();

    let mut body = full_fill_body();
    body["current_price"] = json!(0.0);
    body.as_object_mut().unwrap().remove("market");
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let v = body_json(res).await;
    assert_eq!(v["error"], "current_price must be > 0");
}

#[tokio::test]
async fn estimate_invalid_symbol_is_a_client_error() {
    let app = test_app();

    let mut body = full_fill_body();
    body["pair"] = json!("BTC-LOL");
    let res = app.oneshot(post_estimate(&body)).await.unwrap();

    assert!(res.status().is_client_error());
}

#[tokio::test]
async fn test_effective_limit_on_recent_estimates() {
    let app = test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/estimates/BTC-USD?limit=5000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-effective-limit").unwrap(), "1000");
}

#[tokio::test]
async fn pairguard_rejects_bad_pair_on_recent_estimates() {
    let app = test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/estimates/BTC-EUR")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let v = body_json(res).await;
    assert!(
        v["error"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("unsupported")
    );
}

#[tokio::test]
async fn served_estimates_land_in_the_log_newest_first() {
    let app = test_app();

    let res = app
        .clone()
        .oneshot(post_estimate(&full_fill_body()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let first = body_json(res).await;

    let mut second_body = full_fill_body();
    second_body["order"]["size"] = json!(3.0);
    let res = app
        .clone()
        .oneshot(post_estimate(&second_body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/estimates/BTC-USD")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let log = body_json(res).await;
    let items = log.as_array().unwrap();
    assert_eq!(items.len(), 2);
    // newest first
    assert_eq!(items[0]["order"]["size"].as_f64(), Some(3.0));
    assert_eq!(items[1]["id"], first["id"]);

    // the log is per-pair
    let res = app
        .oneshot(
            Request::builder()
                .uri("/estimates/ETH-USD")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let log = body_json(res).await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let v = body_json(res).await;
    assert_eq!(v["status"], "ok");
}
