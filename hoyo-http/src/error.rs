//! Error types for the HoYoLab request engine

use thiserror::Error;

use crate::response::Diagnostics;

/// Error type shared by the request engine and every API module built on it
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure during the exchange
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URL could not be parsed
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured value is not a valid header value
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The response body could not be decompressed
    #[error("failed to decompress {encoding} response body: {source}")]
    Decompress {
        /// The `content-encoding` value that selected the codec
        encoding: String,
        /// Underlying codec error
        source: std::io::Error,
    },

    /// The response did not declare a JSON content type
    #[error("response content-type is not application/json: {content_type}")]
    NonJsonContentType {
        /// The content type the server declared
        content_type: String,
    },

    /// The response body was not valid JSON
    #[error("failed to parse response body as JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The server answered with an HTTP error status
    #[error("upstream returned HTTP {code}: {message}")]
    UpstreamStatus {
        /// HTTP status code
        code: u16,
        /// Status text, or the response body when no status text exists
        message: String,
        /// Everything that was sent and received for this exchange
        diagnostics: Box<Diagnostics>,
    },

    /// A business-level API failure raised by a module
    #[error("{message}")]
    Api {
        /// Human-readable failure description
        message: String,
        /// Upstream retcode, when the failure mirrors one
        retcode: Option<i64>,
        /// Everything that was sent and received, when available
        diagnostics: Option<Box<Diagnostics>>,
    },
}

impl Error {
    /// Create a business-level API error with only a message
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            retcode: None,
            diagnostics: None,
        }
    }

    /// Create a business-level API error carrying the upstream retcode and
    /// full request/response diagnostics
    pub fn api_with_diagnostics(
        message: impl Into<String>,
        retcode: i64,
        diagnostics: Diagnostics,
    ) -> Self {
        Self::Api {
            message: message.into(),
            retcode: Some(retcode),
            diagnostics: Some(Box::new(diagnostics)),
        }
    }

    /// The upstream retcode or HTTP status attached to this error, if any
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::UpstreamStatus { code, .. } => Some(i64::from(*code)),
            Self::Api { retcode, .. } => *retcode,
            _ => None,
        }
    }
}

/// Result alias used across the engine and all API modules
pub type Result<T> = std::result::Result<T, Error>;
