use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::TransportError;

const HTTP_USER_AGENT: &str = concat!("isbn-shelf/", env!("CARGO_PKG_VERSION"));

/// Status code and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET capability used by the metadata providers. A completed
/// exchange is `Ok` whatever its status; only transport problems are `Err`.
pub trait HttpFetch {
    fn fetch(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// [`HttpFetch`] backed by a blocking reqwest client with a bounded timeout.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(HTTP_USER_AGENT)
            .build()
            .map_err(|err| TransportError::Request {
                url: String::new(),
                reason: err.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl HttpFetch for ReqwestFetcher {
    fn fetch(&self, url: &str) -> Result<HttpResponse, TransportError> {
        debug!(url, "http get");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|err| TransportError::Request {
                url: url.to_string(),
                reason: if err.is_timeout() {
                    "timed out".to_string()
                } else {
                    err.to_string()
                },
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|err| TransportError::Request {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        debug!(url, status, bytes = body.len(), "http response");
        Ok(HttpResponse { status, body })
    }
}
