use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::SyncError;
use crate::feed::RawFeed;
use crate::fetch::{HttpClient, auth::UrlParam, fetch_bytes};
use crate::services::neo_api::{DateRange, NeoApi};

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";

/// NASA NeoWs client. Every request carries the `api_key` query parameter.
pub struct NeoWsClient<C> {
    http: UrlParam<C>,
    base_url: String,
}

impl<C: HttpClient> NeoWsClient<C> {
    /// # Errors
    ///
    /// [`SyncError::MissingApiKey`] when no key, or an empty one, is supplied.
    pub fn new(inner: C, base_url: &str, api_key: Option<String>) -> Result<Self, SyncError> {
        let key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(SyncError::MissingApiKey)?;

        Ok(Self {
            http: UrlParam::api_key(inner, key),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl<C: HttpClient> NeoApi for NeoWsClient<C> {
    #[tracing::instrument(skip(self), fields(start = %range.start(), end = %range.end()))]
    async fn feed(&self, range: DateRange) -> Result<RawFeed, SyncError> {
        let url = format!(
            "{}/feed?start_date={}&end_date={}",
            self.base_url,
            range.start().format("%Y-%m-%d"),
            range.end().format("%Y-%m-%d"),
        );
        info!("Fetching NEO feed");

        let bytes = fetch_bytes(&self.http, &url).await?;
        debug!(bytes = bytes.len(), "Feed bytes received, parsing");

        RawFeed::from_slice(&bytes).map_err(|e| {
            debug!(error = %e, "Feed envelope did not decode");
            SyncError::MalformedPayload
        })
    }

    #[tracing::instrument(skip(self))]
    async fn lookup(&self, id: &str) -> Result<Map<String, Value>, SyncError> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SyncError::InvalidRequest(format!("bad asteroid id {id:?}")));
        }

        let url = format!("{}/neo/{}", self.base_url, id);
        let bytes = fetch_bytes(&self.http, &url).await?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(payload)) => Ok(payload),
            _ => Err(SyncError::MalformedPayload),
        }
    }
}
