//! The mirror, end to end, against a real database.
use actix_web::{http::StatusCode, test::TestRequest, web};
use alfra_common::{Pesos, Secret};
use alfra_engine::{
    db_types::{SaleState, SaleType},
    test_utils::{prepare_test_env, random_db_path},
    OrderSyncApi,
    SqliteDatabase,
    StatusApi,
};
use fudo_tools::FudoSale;
use serde_json::json;

use super::{
    helpers::{send_request, WEBHOOK_SECRET},
    mocks::MockFetcher,
};
use crate::server::configure_routes;

fn raw_sales(state: &str) -> Vec<FudoSale> {
    let sale = json!({"id": "1", "attributes": {"total": 100, "saleState": state}});
    vec![serde_json::from_value(sale).unwrap()]
}

async fn sync(db: &SqliteDatabase, state: &'static str) -> (StatusCode, String) {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch_recent_sales().times(1).returning(move |_| Ok(raw_sales(state)));
    let db = db.clone();
    let req = TestRequest::get().uri("/api/fudo/sync");
    send_request(req, move |cfg| {
        cfg.app_data(web::Data::new(OrderSyncApi::new(db.clone())))
            .app_data(web::Data::new(StatusApi::new(db)))
            .app_data(web::Data::new(fetcher));
        configure_routes::<SqliteDatabase, MockFetcher>(cfg, Secret::new(WEBHOOK_SECRET.to_string()));
    })
    .await
}

#[actix_web::test]
async fn mirror_end_to_end() {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    let api = OrderSyncApi::new(db.clone());

    let (status, body) = sync(&db, "OPEN").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains(r#""procesados":1"#), "{body}");
    let first = api.order_by_external_id("1").await.unwrap().expect("Order was not mirrored");
    assert_eq!(first.total, Pesos::from_pesos(100));
    assert_eq!(first.sale_state, SaleState::Open);
    assert_eq!(first.sale_type, SaleType::Unknown);

    let (status, _) = sync(&db, "CLOSED").await;
    assert_eq!(status, StatusCode::OK);
    let second = api.order_by_external_id("1").await.unwrap().expect("Order has gone missing");
    assert_eq!(second.id, first.id);
    assert_eq!(second.sale_state, SaleState::Closed);
    assert_eq!(second.total, Pesos::from_pesos(100));
    assert_eq!(second.version, first.version + 1);

    let (status, _) = sync(&db, "CLOSED").await;
    assert_eq!(status, StatusCode::OK);
    let third = api.order_by_external_id("1").await.unwrap().unwrap();
    assert_eq!(third.version, second.version, "an unchanged sale is not a new version");
    assert_eq!(third.sale_state, SaleState::Closed);

    db.close().await;
    let _ = std::fs::remove_file(url.trim_start_matches("sqlite://"));
}
