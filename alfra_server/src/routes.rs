//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
use actix_web::{get, web, HttpResponse, Responder};
use alfra_engine::{traits::ProfileManagement, OrderStore, OrderSyncApi, StatusApi, StatusUpdateRequest};
use chrono::NaiveDate;
use futures::StreamExt;
use log::*;

use crate::{
    auth::Caller,
    config::ServerOptions,
    data_objects::{AckResponse, StatusUpdateParams, StatusUpdateResponse, SyncFailure, SyncResponse},
    errors::ServerError,
    integrations::fudo::{mirror_recent_sales, refresh_sale, sale_id_from_payload, SalesFetcher},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    // One backend type that has to satisfy several traits at once
    ($name:ident => $method:ident $path:literal where $backend:ident: $($bounds:path),+)  => {
        paste::paste! { pub struct [<$name:camel Route>]<$backend>(core::marker::PhantomData<fn() -> $backend>);}
        paste::paste! { impl<$backend> [<$name:camel Route>]<$backend> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> $backend>)
            }
        }}
        paste::paste! { impl<$backend> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$backend>
        where
            $backend: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<$backend>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Fudo  ----------------------------------------------------
route!(fudo_sync => Get "/fudo/sync" impl OrderStore, SalesFetcher);
/// Route handler for the mirror trigger.
///
/// Pulls the most recent sales from Fudo (up to the configured page size) and mirrors them into the order store.
/// The response always uses the `{ok, ...}` envelope that the web front end expects, also on failure.
pub async fn fudo_sync<B: OrderStore, F: SalesFetcher>(
    api: web::Data<OrderSyncApi<B>>,
    fetcher: web::Data<F>,
    options: web::Data<ServerOptions>,
) -> HttpResponse {
    debug!("💻️ GET fudo sync");
    match mirror_recent_sales(fetcher.as_ref(), api.as_ref(), options.fudo_page_size).await {
        Ok(report) => {
            info!("💻️ Mirrored {} sales from Fudo", report.processed);
            HttpResponse::Ok().json(SyncResponse {
                ok: true,
                mensaje: "Sincronización completa".to_string(),
                procesados: report.processed,
                ejemplo: report.sample,
            })
        },
        Err(e) => {
            warn!("💻️ Fudo sync failed. {e}");
            HttpResponse::InternalServerError().json(SyncFailure::new(e.to_string()))
        },
    }
}

/// Webhook bodies larger than this are dropped unread. Fudo notifications are small, but the cap sits well above the
/// default JSON limit so that verbose payloads still get through.
pub const WEBHOOK_BODY_LIMIT: usize = 1024 * 1024;

async fn read_webhook_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, String> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        if body.len() + chunk.len() > limit {
            return Err(format!("body is larger than {limit} bytes"));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

route!(fudo_webhook => Post "" impl OrderStore, SalesFetcher);
/// Route handler for Fudo webhook callbacks.
///
/// The body is read up to [`WEBHOOK_BODY_LIMIT`] bytes. The shared secret has already been checked by the time this runs. Everything here is best effort: an unreadable
/// body, a payload that names no sale or a failed refresh are logged, and Fudo always gets a `200 {ok: true}` so that
/// it does not keep retrying.
pub async fn fudo_webhook<B: OrderStore, F: SalesFetcher>(
    payload: web::Payload,
    api: web::Data<OrderSyncApi<B>>,
    fetcher: web::Data<F>,
) -> HttpResponse {
    let body = match read_webhook_body(payload, WEBHOOK_BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            warn!("🛎️ Could not read Fudo webhook body. {e}");
            return HttpResponse::Ok().json(AckResponse::ok());
        },
    };
    trace!("🛎️ Received Fudo webhook call ({} bytes)", body.len());
    let payload = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("🛎️ Fudo webhook payload is not valid JSON. {e}");
            return HttpResponse::Ok().json(AckResponse::ok());
        },
    };
    let Some(sale_id) = sale_id_from_payload(&payload) else {
        info!("🛎️ Fudo webhook payload does not name a sale. Nothing to refresh.");
        return HttpResponse::Ok().json(AckResponse::ok());
    };
    match refresh_sale(fetcher.as_ref(), api.as_ref(), &sale_id).await {
        Ok(true) => info!("🛎️ Sale #{sale_id} refreshed from Fudo"),
        Ok(false) => info!("🛎️ Webhook named sale #{sale_id}, but Fudo does not know it"),
        Err(e) => warn!("🛎️ Could not refresh sale #{sale_id}. {e}"),
    }
    HttpResponse::Ok().json(AckResponse::ok())
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(update_order_status => Post "/orders/status" where B: OrderStore, ProfileManagement);
/// Route handler for status changes.
///
/// The caller is identified by the bearer token in the `Authorization` header. Callers without a valid token, or
/// without a profile, are rejected with a 401. An optional `version` in the body makes the change conditional on the
/// order not having changed since the caller last read it.
pub async fn update_order_status<B>(
    caller: Caller,
    body: web::Json<StatusUpdateParams>,
    api: web::Data<StatusApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore + ProfileManagement,
{
    let params = body.into_inner();
    debug!("💻️ POST status '{}' for order #{}", params.estado, params.order_id);
    let request = StatusUpdateRequest::try_from(params)?;
    let order = api.apply_status_change(caller.id(), request).await.map_err(|e| {
        debug!("💻️ Status change was not applied. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(StatusUpdateResponse { ok: true, order_id: order.id, estado: order.status }))
}

route!(orders_for_day => Get "/orders/day/{day}" impl OrderStore);
/// Route handler for the day view. Returns the mirrored orders created on the given restaurant calendar day.
pub async fn orders_for_day<B: OrderStore>(
    caller: Caller,
    path: web::Path<String>,
    api: web::Data<OrderSyncApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let claims = caller.require()?;
    let day = NaiveDate::parse_from_str(path.as_str(), "%Y-%m-%d")
        .map_err(|e| ServerError::BadPayload(format!("'{}' is not a YYYY-MM-DD date. {e}", path.as_str())))?;
    debug!("💻️ GET orders for {day} by {}", claims.sub);
    let orders = api.orders_for_day(day, options.utc_offset).await.map_err(|e| {
        debug!("💻️ Could not fetch orders for {day}. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(orders))
}
