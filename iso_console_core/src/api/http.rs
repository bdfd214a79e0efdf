use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use super::client::ConsoleApi;
use super::errors::TransportError;
use super::types::{
    ApiResponse, ConnectionRecord, CreateConnectionRequest, ExchangeResponse, SendMessageRequest,
};

/// Longest slice of an unparseable error body kept in a `TransportError`.
const MAX_ERROR_BODY: usize = 200;

/// `ConsoleApi` over HTTP/JSON.
///
/// Cloning is cheap: `reqwest::Client` is reference counted internally, so
/// clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:8081/api/iso8583`.
    /// Every request is bounded by `timeout`; a zero `timeout` means none.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }
        let mut builder = Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path; each one is percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, TransportError> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }
}

/// Reads the whole body and decodes it as `T`.
///
/// A body in the expected shape wins over the status code, so a 4xx/5xx that
/// still carries `{"success":false,"message":...}` reaches the caller as a
/// regular reply.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.bytes().await?;
    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(TransportError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body)
                .trim()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect(),
        }),
        Err(e) => Err(TransportError::Decode(e.to_string())),
    }
}

#[async_trait]
impl ConsoleApi for HttpApiClient {
    async fn list_connections(&self) -> Result<Vec<ConnectionRecord>, TransportError> {
        let response = self.request(Method::GET, &["connections"])?.send().await?;
        decode(response).await
    }

    async fn create_connection(
        &self,
        connection_id: &str,
        host: &str,
        port: u16,
    ) -> Result<ApiResponse, TransportError> {
        let body = CreateConnectionRequest {
            connection_id: connection_id.to_string(),
            host: host.to_string(),
            port,
        };
        // `.json` also sets `Content-Type: application/json`.
        let response = self
            .request(Method::POST, &["connections"])?
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_connection(&self, connection_id: &str) -> Result<ApiResponse, TransportError> {
        let response = self
            .request(Method::DELETE, &["connections", connection_id])?
            .send()
            .await?;
        decode(response).await
    }

    async fn connect(&self, connection_id: &str) -> Result<ApiResponse, TransportError> {
        let response = self
            .request(Method::POST, &["connections", connection_id, "connect"])?
            .send()
            .await?;
        decode(response).await
    }

    async fn disconnect(&self, connection_id: &str) -> Result<ApiResponse, TransportError> {
        let response = self
            .request(Method::POST, &["connections", connection_id, "disconnect"])?
            .send()
            .await?;
        decode(response).await
    }

    async fn send_echo(&self, connection_id: &str) -> Result<ExchangeResponse, TransportError> {
        let response = self
            .request(Method::POST, &["connections", connection_id, "echo"])?
            .send()
            .await?;
        decode(response).await
    }

    async fn send_message(
        &self,
        connection_id: &str,
        message: &str,
    ) -> Result<ExchangeResponse, TransportError> {
        let body = SendMessageRequest {
            message: message.to_string(),
        };
        let response = self
            .request(Method::POST, &["connections", connection_id, "send"])?
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }
}
