use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use alfra_common::Secret;
use alfra_engine::{traits::ProfileManagement, OrderStore, OrderSyncApi, SqliteDatabase, StatusApi};
use fudo_tools::FudoApi;
use log::*;

use crate::{
    auth::TokenVerifier,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::fudo::SalesFetcher,
    middleware::WebhookSecretFactory,
    routes::{health, FudoSyncRoute, FudoWebhookRoute, OrdersForDayRoute, UpdateOrderStatusRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migrations failed. {e}")))?;
    info!("🗃️ Database at {} is ready", db.url());
    let fudo = FudoApi::new(config.fudo.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, fudo)?;
    srv.await.map_err(ServerError::from)
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase, fudo: FudoApi) -> Result<Server, ServerError> {
    if config.webhook_secret.is_empty() {
        warn!("🪛️ ALFRA_FUDO_WEBHOOK_SECRET is not set. All Fudo webhook calls will be rejected.");
    }
    if config.auth.jwt_secret.is_empty() {
        warn!("🪛️ ALFRA_JWT_SECRET is not set. No bearer token will be accepted.");
    }
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let sync_api = OrderSyncApi::new(db.clone());
        let status_api = StatusApi::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth);
        let options = ServerOptions::from_config(&config);
        let webhook_secret = config.webhook_secret.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("alfra::access_log"))
            .app_data(web::Data::new(sync_api))
            .app_data(web::Data::new(status_api))
            .app_data(web::Data::new(fudo.clone()))
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(options))
            .configure(|cfg| configure_routes::<SqliteDatabase, FudoApi>(cfg, webhook_secret))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Registers every route of the server.
///
/// The webhook scope is registered ahead of `/api` so that the shared-secret check only applies to the webhook.
/// Malformed JSON bodies are reported as `400 {error}`.
pub fn configure_routes<B, F>(cfg: &mut web::ServiceConfig, webhook_secret: Secret<String>)
where
    B: OrderStore + ProfileManagement + 'static,
    F: SalesFetcher + 'static,
{
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::BadPayload(format!("Could not read the request body. {err}")).into());
    let webhook_scope = web::scope("/api/fudo/webhook")
        .wrap(WebhookSecretFactory::new(webhook_secret))
        .service(FudoWebhookRoute::<B, F>::new());
    let api_scope = web::scope("/api")
        .app_data(json_config)
        .service(FudoSyncRoute::<B, F>::new())
        .service(UpdateOrderStatusRoute::<B>::new())
        .service(OrdersForDayRoute::<B>::new());
    cfg.service(health).service(webhook_scope).service(api_scope);
}
