use std::fmt::{self, Display};

/// Everything that can go wrong between issuing a request and holding a
/// decoded payload in hand.
#[derive(Debug)]
pub enum TransportError {
    /// The configured base URL (or a path built from it) is not a valid URL.
    InvalidUrl(String),
    /// The request never produced a response (refused, DNS, timeout, ...).
    Network(String),
    /// A non-2xx response whose body was not the expected JSON shape.
    Status { status: u16, body: String },
    /// A 2xx response whose body was not the expected JSON shape.
    Decode(String),
}

/// Convert from reqwest::Error.
/// Lets the HTTP client use `?` on every send/read call.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Status { status, body } if body.is_empty() => {
                write!(f, "HTTP {}", status)
            }
            TransportError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            TransportError::Decode(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}
