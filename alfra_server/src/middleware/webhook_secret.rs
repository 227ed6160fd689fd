//! Shared-secret middleware for webhook endpoints.
//!
//! Fudo cannot sign its webhook calls, so each webhook url carries a secret in its query string (`?secret=...`). This
//! middleware compares that value against the configured secret and rejects the call with a 401 before the handler
//! runs. The request body is never read for rejected calls.
//!
//! An empty configured secret rejects every call.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use alfra_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use serde::Deserialize;

use crate::errors::{AuthError, ServerError};

#[derive(Debug, Deserialize)]
struct SecretQuery {
    secret: Option<String>,
}

pub struct WebhookSecretFactory {
    secret: Secret<String>,
}

impl WebhookSecretFactory {
    pub fn new(secret: Secret<String>) -> Self {
        WebhookSecretFactory { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for WebhookSecretFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = WebhookSecretService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WebhookSecretService { secret: self.secret.clone(), service: Rc::new(service) }))
    }
}

pub struct WebhookSecretService<S> {
    secret: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for WebhookSecretService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let supplied = web::Query::<SecretQuery>::from_query(req.query_string()).ok().and_then(|q| q.0.secret);
        let accepted = supplied.as_deref().map(|s| self.secret.matches(s)).unwrap_or(false);
        Box::pin(async move {
            if accepted {
                trace!("🛎️ Webhook secret accepted");
                service.call(req).await
            } else {
                warn!("🛎️ Webhook call from {:?} with a missing or wrong secret. Denying access.", req.peer_addr());
                Err(ServerError::AuthenticationError(AuthError::InvalidWebhookSecret).into())
            }
        })
    }
}
