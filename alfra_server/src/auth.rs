//! Bearer token verification.
//!
//! Access tokens are issued by the hosted identity provider and signed with HS256 using a secret shared with this
//! server. The server only verifies them. The `sub` claim identifies the caller and is passed explicitly to the engine,
//! which resolves it against the `profiles` table.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use alfra_common::Secret;
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    TimeOptions,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The claims this server cares about. The identity provider adds more, which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct TokenVerifier {
    secret: Secret<String>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.jwt_secret.clone() }
    }

    /// Checks the signature and expiry of an access token and returns its claims. Tokens without an expiry are
    /// rejected.
    pub fn verify<S: AsRef<str>>(&self, token: S) -> Result<JwtClaims, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::ValidationError("Token verification is not configured".to_string()));
        }
        let untrusted_token =
            UntrustedToken::new(token.as_ref()).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let key = Hs256Key::new(self.secret.reveal().as_bytes());
        let token = Hs256
            .validator::<JwtClaims>(&key)
            .validate(&untrusted_token)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        let claims = token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        if claims.custom.sub.trim().is_empty() {
            return Err(AuthError::ValidationError("Token has no subject".to_string()));
        }
        trace!("🔐️ Access token for {} validated", claims.custom.sub);
        Ok(claims.custom.clone())
    }
}

/// The identity behind a request, if it carried a valid bearer token.
///
/// Extracting a `Caller` never fails on a bad or missing token. Handlers decide whether an identity is required, either
/// by calling [`Caller::require`] or by passing [`Caller::id`] on to the engine.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    claims: Option<JwtClaims>,
    rejection: Option<AuthError>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }

    pub fn claims(&self) -> Option<&JwtClaims> {
        self.claims.as_ref()
    }

    pub fn require(&self) -> Result<&JwtClaims, ServerError> {
        match (&self.claims, &self.rejection) {
            (Some(claims), _) => Ok(claims),
            (None, Some(e)) => Err(e.clone().into()),
            (None, None) => Err(AuthError::MissingToken.into()),
        }
    }

    fn from_request_headers(req: &HttpRequest) -> Result<Self, ServerError> {
        let Some(header) = req.headers().get(AUTHORIZATION) else {
            return Ok(Self::anonymous());
        };
        let verifier = req
            .app_data::<web::Data<TokenVerifier>>()
            .ok_or_else(|| ServerError::InitializeError("No token verifier has been configured".to_string()))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
            .map(str::trim)
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected 'Bearer <token>'".to_string()));
        let result = token.and_then(|t| verifier.verify(t));
        match result {
            Ok(claims) => Ok(Self { claims: Some(claims), rejection: None }),
            Err(e) => {
                debug!("🔐️ Ignoring bearer token. {e}");
                Ok(Self { claims: None, rejection: Some(e) })
            },
        }
    }
}

impl FromRequest for Caller {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_headers(req))
    }
}
