mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::SyncError;

/// Issues a GET through `client` and returns the body of a 2xx response.
///
/// # Errors
///
/// Non-2xx responses become [`SyncError::Upstream`] carrying the status and
/// the message NeoWs put in the body.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>, SyncError> {
    let url: reqwest::Url = url
        .parse()
        .map_err(|e| SyncError::InvalidRequest(format!("bad url {url}: {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        return Err(SyncError::upstream(status.as_u16(), &bytes));
    }

    Ok(bytes.to_vec())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::HttpClient;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Canned-response client that records every URL it is asked for.
    pub struct FakeClient {
        pub status: u16,
        pub body: String,
        pub seen: Mutex<Vec<String>>,
    }

    impl FakeClient {
        pub fn new(status: u16, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn urls(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for FakeClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.seen.lock().unwrap().push(req.url().to_string());
            let resp = axum::http::Response::builder()
                .status(self.status)
                .body(self.body.clone())
                .unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }
}
