//! HTTP transport seam shared by the Linear and GitHub sides
//!
//! Both remotes are reached through [`Transport`], which hands back the raw
//! body bytes together with the response head. `reqwest::Client` is the
//! production implementation; tests substitute a scripted fake.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result, TransportError};

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("byelinear/", env!("CARGO_PKG_VERSION"));

/// Successful HTTP response: status, headers and raw body bytes
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a response with a JSON body and no headers
    pub fn json(status: StatusCode, value: &Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: value.to_string().into_bytes(),
        }
    }

    /// Attach a header to the response
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }
}

/// Executes a single HTTP request against a remote API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `body` (as JSON, if any) to `url` and return the raw response
    ///
    /// Non-2xx statuses are reported as [`Error::Transport`] with the
    /// response head attached.
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<RawResponse>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        trace!(%method, url, "Sending request");

        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            return Err(Error::Transport(TransportError {
                status: Some(status),
                headers: Some(headers),
                message: String::from_utf8_lossy(&body).into_owned(),
            }));
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        (**self).send(method, url, body).await
    }
}

/// Build a `reqwest::Client` that sends `authorization` with every request
///
/// `extra` headers (e.g. GitHub's `Accept`) are added as defaults too.
pub fn authenticated_client(
    authorization: &str,
    extra: &[(&'static str, &'static str)],
) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(authorization)
        .map_err(|e| Error::Auth(format!("Invalid authorization header: {}", e)))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    for (name, value) in extra {
        headers.insert(*name, HeaderValue::from_static(*value));
    }

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Auth(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(any(test, feature = "testing"))]
pub use scripted::{RecordedRequest, ScriptedTransport};

#[cfg(any(test, feature = "testing"))]
mod scripted {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// A request captured by [`ScriptedTransport`]
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: Method,
        pub url: String,
        pub body: Option<Value>,
    }

    impl RecordedRequest {
        /// GraphQL query text, if this was a GraphQL request
        pub fn query(&self) -> Option<&str> {
            self.body.as_ref()?.get("query")?.as_str()
        }

        /// GraphQL variable by name
        pub fn variable(&self, name: &str) -> Option<&Value> {
            self.body.as_ref()?.get("variables")?.get(name)
        }
    }

    type Responder = dyn Fn(&RecordedRequest) -> Result<RawResponse> + Send + Sync;

    /// Fake transport that records requests and answers from a closure
    pub struct ScriptedTransport {
        responder: Box<Responder>,
        requests: Mutex<Vec<RecordedRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedTransport {
        pub fn new(
            responder: impl Fn(&RecordedRequest) -> Result<RawResponse> + Send + Sync + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                requests: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        /// Sleep before answering each request
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Requests seen so far, in order
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            method: Method,
            url: &str,
            body: Option<&Value>,
        ) -> Result<RawResponse> {
            let recorded = RecordedRequest {
                method,
                url: url.to_string(),
                body: body.cloned(),
            };
            self.requests.lock().unwrap().push(recorded.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.responder)(&recorded)
        }
    }
}
