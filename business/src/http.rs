//! HTTP client whose futures are `Send` on every target.
//!
//! On native, requests go through reqwest directly. On wasm, `reqwest::Response`
//! holds JS values and is not `Send`, so the request runs on the JS thread via
//! `wasm_bindgen_futures::spawn_local` and the result comes back over a
//! `flume` channel. Commands can then return `Send` futures everywhere.

use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use thiserror::Error;

/// Upper bound for a single request on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Response reduced to `Send`-safe parts.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Lowercased names.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("request to {url} was dropped before completing")]
    Dropped { url: String },
}

pub type HttpResult<T> = Result<T, HttpError>;

/// GET request under construction.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: String,
    headers: BTreeMap<String, String>,
    query: Vec<(String, String)>,
}

impl RequestBuilder {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            query: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Append query pairs; order is kept on the wire.
    pub fn query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub async fn send(self) -> HttpResult<Response> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.execute().await
        }

        #[cfg(target_arch = "wasm32")]
        {
            let url = self.url.clone();
            let (tx, rx) = flume::bounded::<HttpResult<Response>>(1);
            wasm_bindgen_futures::spawn_local(async move {
                let result = self.execute().await;
                // Receiver gone means the command was cancelled.
                let _ = tx.send_async(result).await;
            });
            rx.recv_async()
                .await
                .map_err(|_| HttpError::Dropped { url })?
        }
    }

    async fn execute(self) -> HttpResult<Response> {
        let Self {
            url,
            headers,
            query,
        } = self;
        let failed = |err: reqwest::Error| HttpError::Request {
            url: url.clone(),
            message: err.to_string(),
        };

        let mut request = reqwest::Client::new().get(&url).query(&query);
        for (name, value) in &headers {
            request = request.header(name, value);
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            request = request.timeout(REQUEST_TIMEOUT);
        }

        let response = request.send().await.map_err(failed)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_lowercase(), value.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(failed)?.to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

pub struct Client;

impl Client {
    pub fn get(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(url)
    }
}
