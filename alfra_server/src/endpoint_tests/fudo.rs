use actix_web::{http::StatusCode, test::TestRequest, web};
use alfra_engine::db_types::{NewOrder, SaleState};
use fudo_tools::{FudoApiError, FudoSale, SaleAttributes};

use super::helpers::{send_request, Backends, WEBHOOK_SECRET};
use crate::routes::WEBHOOK_BODY_LIMIT;

fn webhook_request(secret: Option<&str>, body: impl Into<web::Bytes>) -> TestRequest {
    let uri = match secret {
        Some(s) => format!("/api/fudo/webhook?secret={s}"),
        None => "/api/fudo/webhook".to_string(),
    };
    TestRequest::post().uri(&uri).insert_header(("Content-Type", "application/json")).set_payload(body)
}

fn sale(id: &str, state: &str) -> FudoSale {
    FudoSale::new(id, SaleAttributes { total: Some(100.0), sale_state: Some(state.into()), ..Default::default() })
}

#[actix_web::test]
async fn health_check() {
    let req = TestRequest::get().uri("/health");
    let (status, body) = send_request(req, |cfg| Backends::default().configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn webhook_with_wrong_secret() {
    let _ = env_logger::try_init().ok();
    for secret in [None, Some("guess"), Some("")] {
        let mut backends = Backends::default();
        backends.fetcher.expect_fetch_sale().never();
        backends.sync_store.expect_upsert_orders().never();
        let req = webhook_request(secret, r#"{"saleId": "42"}"#);
        let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{secret:?}");
        assert_eq!(body, r#"{"error":"Authentication Error. Webhook secret is missing or incorrect."}"#);
    }
}

#[actix_web::test]
async fn webhook_with_garbage_body() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_sale().never();
    let req = webhook_request(Some(WEBHOOK_SECRET), "this is {not json");
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

#[actix_web::test]
async fn webhook_without_sale_id() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_sale().never();
    let req = webhook_request(Some(WEBHOOK_SECRET), r#"{"event": "ping"}"#);
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

#[actix_web::test]
async fn webhook_refreshes_named_sale() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends
        .fetcher
        .expect_fetch_sale()
        .withf(|id: &str| id == "42")
        .times(1)
        .returning(|id| Ok(Some(sale(id, "CLOSED"))));
    backends
        .sync_store
        .expect_upsert_orders()
        .withf(|orders: &[NewOrder]| {
            orders.len() == 1 && orders[0].external_id == "42" && orders[0].sale_state == SaleState::Closed
        })
        .times(1)
        .returning(|orders| Ok(orders.len()));
    let req = webhook_request(Some(WEBHOOK_SECRET), r#"{"data": {"type": "Sale", "id": 42}}"#);
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

#[actix_web::test]
async fn webhook_failures_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends
        .fetcher
        .expect_fetch_sale()
        .times(1)
        .returning(|_| Err(FudoApiError::RestResponseError("connection reset".into())));
    backends.sync_store.expect_upsert_orders().never();
    let req = webhook_request(Some(WEBHOOK_SECRET), r#"{"saleId": "42"}"#);
    let (status, _) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);

    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_sale().times(1).returning(|_| Ok(None));
    backends.sync_store.expect_upsert_orders().never();
    let req = webhook_request(Some(WEBHOOK_SECRET), r#"{"id": "404"}"#);
    let (status, _) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn webhook_accepts_bodies_above_json_limit() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_sale().withf(|id: &str| id == "42").times(1).returning(|_| Ok(None));
    backends.sync_store.expect_upsert_orders().never();
    let padding = "x".repeat(300 * 1024);
    let body = format!(r#"{{"saleId": "42", "notes": "{padding}"}}"#);
    let req = webhook_request(Some(WEBHOOK_SECRET), body);
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

#[actix_web::test]
async fn oversized_webhook_is_acknowledged_unread() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_sale().never();
    backends.sync_store.expect_upsert_orders().never();
    let padding = "x".repeat(WEBHOOK_BODY_LIMIT + 1);
    let body = format!(r#"{{"saleId": "42", "notes": "{padding}"}}"#);
    let req = webhook_request(Some(WEBHOOK_SECRET), body);
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

#[actix_web::test]
async fn fudo_sync() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends
        .fetcher
        .expect_fetch_recent_sales()
        .withf(|limit| *limit == 50)
        .times(1)
        .returning(|_| Ok(vec![sale("2", "OPEN"), sale("1", "CLOSED")]));
    backends.sync_store.expect_upsert_orders().times(1).returning(|orders| Ok(orders.len()));
    let req = TestRequest::get().uri("/api/fudo/sync");
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["procesados"], 2);
    assert_eq!(json["ejemplo"]["external_id"], "2");
    assert_eq!(json["ejemplo"]["sale_state"], "OPEN");
    assert_eq!(json["ejemplo"]["sale_type"], "UNKNOWN");
    assert_eq!(json["ejemplo"]["total"], 100);
}

#[actix_web::test]
async fn fudo_sync_with_no_sales() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_recent_sales().returning(|_| Ok(vec![]));
    backends.sync_store.expect_upsert_orders().never();
    let req = TestRequest::get().uri("/api/fudo/sync");
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true,"mensaje":"Sincronización completa","procesados":0}"#);
}

#[actix_web::test]
async fn fudo_sync_failures() {
    let _ = env_logger::try_init().ok();
    let mut backends = Backends::default();
    backends
        .fetcher
        .expect_fetch_recent_sales()
        .returning(|_| Err(FudoApiError::AuthenticationFailed("401 Unauthorized".into())));
    backends.sync_store.expect_upsert_orders().never();
    let req = TestRequest::get().uri("/api/fudo/sync");
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("401 Unauthorized"), "{body}");

    let mut backends = Backends::default();
    backends.fetcher.expect_fetch_recent_sales().returning(|_| Ok(vec![sale("1", "OPEN")]));
    backends
        .sync_store
        .expect_upsert_orders()
        .returning(|_| Err(alfra_engine::OrderStoreError::DatabaseError("disk I/O error".into())));
    let req = TestRequest::get().uri("/api/fudo/sync");
    let (status, body) = send_request(req, |cfg| backends.configure(cfg)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("disk I/O error"), "{body}");
}
