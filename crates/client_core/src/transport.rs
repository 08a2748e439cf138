use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{contact_route, ContactRequest, ContactResponse};
use tracing::debug;
use url::Url;

use crate::{
    error::{ClientError, TransportError},
    types::Acknowledgement,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers one contact request. Implementations make exactly one attempt per call.
#[async_trait]
pub trait ContactTransport: Send + Sync {
    async fn submit(&self, request: &ContactRequest) -> Result<Acknowledgement, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        Self::from_url(Url::parse(endpoint)?, timeout)
    }

    /// Targets the contact route on `base_url`, e.g. `http://localhost:3002`.
    pub fn for_server(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = Url::parse(base_url)?.join(contact_route())?;
        Self::from_url(endpoint, timeout)
    }

    fn from_url(endpoint: Url, timeout: Duration) -> Result<Self, ClientError> {
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme(endpoint.scheme().to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ContactTransport for HttpTransport {
    async fn submit(&self, request: &ContactRequest) -> Result<Acknowledgement, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "contact endpoint responded");
        interpret_response(status, &body)
    }
}

/// Maps an HTTP exchange onto the submission contract. The status code decides the direction;
/// a success status must also carry a success payload. An empty or non-JSON 2xx body is therefore
/// `MalformedResponse`, stricter than a plain `response.ok` check.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<Acknowledgement, TransportError> {
    if !(200..300).contains(&status) {
        let detail = match ContactResponse::decode(body) {
            Ok(ContactResponse::Rejected { error }) => error,
            _ => format!("HTTP {status}"),
        };
        return Err(TransportError::Rejected { status, detail });
    }

    match ContactResponse::decode(body) {
        Ok(ContactResponse::Received {
            success: true,
            message,
        }) => Ok(Acknowledgement { message }),
        Ok(other) => Err(TransportError::MalformedResponse(format!(
            "status {status} carried a non-success payload: {other:?}"
        ))),
        Err(err) => Err(TransportError::MalformedResponse(err.to_string())),
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
