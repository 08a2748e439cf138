use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("contact endpoint unreachable: {0}")]
    Network(String),
    #[error("contact request timed out")]
    Timeout,
    #[error("contact endpoint rejected submission with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("malformed contact response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            TransportError::Timeout
        } else if value.is_decode() || value.is_body() {
            TransportError::MalformedResponse(value.to_string())
        } else {
            TransportError::Network(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid contact endpoint url: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("unsupported contact endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
