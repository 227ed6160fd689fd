use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use alfra_common::{Pesos, Secret};
use alfra_engine::{
    db_types::{Order, OrderStatus, Profile, Role, SaleState, SaleType},
    OrderSyncApi,
    StatusApi,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
};
use log::debug;

use super::mocks::{MockFetcher, MockStore};
use crate::{
    auth::{JwtClaims, TokenVerifier},
    config::{AuthConfig, ServerOptions},
    server::configure_routes,
};

// DO NOT re-use these secrets anywhere.
pub const JWT_SECRET: &str = "endpoint-tests-jwt-secret-0b9c5e1f";
pub const WEBHOOK_SECRET: &str = "endpoint-tests-webhook-secret";

pub fn issue_token(claims: JwtClaims, expiry: DateTime<Utc>) -> String {
    let key = Hs256Key::new(JWT_SECRET.as_bytes());
    let header = Header::empty().with_token_type("JWT");
    let mut claims = Claims::new(claims);
    claims.expiration = Some(expiry);
    Hs256.token(&header, &claims, &key).expect("Failed to sign token")
}

pub fn valid_token(sub: &str) -> String {
    issue_token(JwtClaims { sub: sub.to_string(), email: None }, Utc::now() + Duration::days(1))
}

/// The backends the routes run against. Mocks without expectations fail the test if they are called.
#[derive(Default)]
pub struct Backends {
    pub sync_store: MockStore,
    pub status_store: MockStore,
    pub fetcher: MockFetcher,
}

impl Backends {
    pub fn configure(self, cfg: &mut ServiceConfig) {
        cfg.app_data(web::Data::new(OrderSyncApi::new(self.sync_store)))
            .app_data(web::Data::new(StatusApi::new(self.status_store)))
            .app_data(web::Data::new(self.fetcher));
        configure_routes::<MockStore, MockFetcher>(cfg, Secret::new(WEBHOOK_SECRET.to_string()));
    }
}

/// Sends `req` through a fresh app and returns the status and body. Errors raised by middleware are rendered the way
/// the server would render them.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::Data::new(TokenVerifier::new(&AuthConfig::new(JWT_SECRET))))
        .app_data(web::Data::new(ServerOptions::default()))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.expect("Could not read error body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn order(id: i64, status: OrderStatus, version: i64) -> Order {
    let synced_at = Utc.with_ymd_and_hms(2024, 5, 3, 23, 0, 0).unwrap();
    Order {
        id,
        external_id: format!("10{id}"),
        created_at_external: Some(Utc.with_ymd_and_hms(2024, 5, 3, 22, 15, 0).unwrap()),
        closed_at_external: None,
        total: Pesos::from_pesos(18_500),
        sale_type: SaleType::Delivery,
        sale_state: SaleState::InCourse,
        customer_name: Some("Lucía Gómez".to_string()),
        status,
        status_source: None,
        status_changed_at: None,
        status_changed_by: None,
        version,
        synced_at,
    }
}

pub fn profile(id: &str, role: Role) -> Profile {
    Profile {
        id: id.to_string(),
        full_name: None,
        role,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}
