use std::sync::Arc;

use alfra_common::Secret;
use chrono::{DateTime, Duration, Utc};
use log::*;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;

use crate::{
    config::FudoConfig,
    data_objects::{AuthResponse, SaleDocument, SalesPage},
    FudoApiError,
    FudoSale,
};

/// Fudo will not hand out more than this many sales in one page.
pub const MAX_PAGE_SIZE: usize = 500;

/// Tokens are refreshed this long before they actually expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::seconds(60);

#[derive(Clone)]
struct AccessToken {
    token: Secret<String>,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Clone)]
pub struct FudoApi {
    config: FudoConfig,
    client: Arc<Client>,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl FudoApi {
    pub fn new(config: FudoConfig) -> Result<Self, FudoApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FudoApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(Mutex::new(None)) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Returns a bearer token for the REST API, requesting a new one if the cached token is missing or about to expire.
    pub async fn access_token(&self) -> Result<Secret<String>, FudoApiError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.clone());
        }
        let token = self.authenticate().await?;
        let result = token.token.clone();
        *cached = Some(token);
        Ok(result)
    }

    async fn authenticate(&self) -> Result<AccessToken, FudoApiError> {
        if self.config.api_key.is_empty() || self.config.api_secret.is_empty() {
            return Err(FudoApiError::AuthenticationFailed("API key and secret are not configured".to_string()));
        }
        debug!("🧾️ Requesting a new Fudo access token");
        let body = json!({
            "apiKey": self.config.api_key.reveal(),
            "apiSecret": self.config.api_secret.reveal(),
        });
        let response = self
            .client
            .post(&self.config.auth_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FudoApiError::AuthenticationFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(FudoApiError::AuthenticationFailed(format!("{status}. {message}")));
        }
        let auth = response.json::<AuthResponse>().await.map_err(|e| FudoApiError::JsonError(e.to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(auth.exp, 0).ok_or_else(|| {
            FudoApiError::AuthenticationFailed(format!("Token expiry {} is not a valid timestamp", auth.exp))
        })?;
        info!("🧾️ Fudo access token issued, valid until {expires_at}");
        Ok(AccessToken { token: Secret::new(auth.token), expires_at })
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }

    pub async fn rest_query<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, FudoApiError> {
        let url = self.url(path);
        let token = self.access_token().await?;
        trace!("🧾️ Sending REST query: {url}");
        let mut req = self.client.get(url).bearer_auth(token.reveal());
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| FudoApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("🧾️ REST query successful. {status}");
            return response.json::<T>().await.map_err(|e| FudoApiError::JsonError(e.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED {
            debug!("🧾️ Fudo rejected the access token. It will be renewed on the next call.");
            self.forget_token().await;
        }
        let message = response.text().await.map_err(|e| FudoApiError::RestResponseError(e.to_string()))?;
        Err(FudoApiError::QueryError { status: status.as_u16(), message })
    }

    /// Fetches the `limit` most recent sales, newest first, in a single page. `limit` is clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub async fn fetch_recent_sales(&self, limit: usize) -> Result<Vec<FudoSale>, FudoApiError> {
        let size = limit.clamp(1, MAX_PAGE_SIZE);
        debug!("🧾️ Fetching the {size} most recent sales");
        let params = [
            ("page[size]", size.to_string()),
            ("page[number]", "1".to_string()),
            ("sort", "-createdAt".to_string()),
            ("include", "customer".to_string()),
        ];
        let page = self.rest_query::<SalesPage>("/sales", &params).await?;
        let sales = page.sales();
        info!("🧾️ Fetched {} sales from Fudo", sales.len());
        Ok(sales)
    }

    /// Fetches a single sale together with its customer. Returns `Ok(None)` if Fudo does not know the sale.
    ///
    /// Sale ids become a path segment, so anything other than ASCII letters, digits, `-` and `_` is refused before
    /// Fudo is contacted.
    pub async fn fetch_sale(&self, sale_id: &str) -> Result<Option<FudoSale>, FudoApiError> {
        if !is_valid_sale_id(sale_id) {
            return Err(FudoApiError::InvalidRequest(format!("'{sale_id}' is not a valid sale id")));
        }
        let path = format!("/sales/{sale_id}");
        debug!("🧾️ Fetching sale #{sale_id}");
        match self.rest_query::<SaleDocument>(&path, &[("include", "customer".to_string())]).await {
            Ok(doc) => Ok(doc.sale()),
            Err(FudoApiError::QueryError { status: 404, .. }) => {
                info!("🧾️ Sale #{sale_id} does not exist on Fudo");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }
}

fn is_valid_sale_id(sale_id: &str) -> bool {
    !sale_id.is_empty() && sale_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
