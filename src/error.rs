//! Classified errors
//!
//! Every failure of a resource operation resolves to exactly one
//! [`ResourceError`] kind. Each kind has a stable, scannable `summary()` and a
//! `detail()` carrying the method, path, status code and a raw payload excerpt.

use crate::resource::cardinality::{Ambiguous, MalformedEnvelope};
use crate::resource::decode::{DecodeFailure, RawRecord};
use crate::resource::transport::{Method, TransportFailure};
use thiserror::Error;

/// Maximum length of a raw payload carried in a diagnostic detail
const MAX_EXCERPT_LENGTH: usize = 200;

/// Truncate a payload and drop control characters before it lands in logs or
/// diagnostics
pub fn excerpt(body: &str) -> String {
    let truncated = if body.len() > MAX_EXCERPT_LENGTH {
        let mut end = MAX_EXCERPT_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

pub(crate) fn record_excerpt(record: &RawRecord) -> String {
    excerpt(&serde_json::to_string(record).unwrap_or_default())
}

fn status_text(status: Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// Failed call, non-success status, or an unparseable envelope
    #[error("error {} {path}", .method.verb())]
    Transport {
        method: Method,
        path: String,
        status: Option<u16>,
        message: String,
        /// Body excerpt when the response arrived but could not be used
        raw: Option<String>,
    },

    /// Success status without the record(s) the operation requires
    #[error("empty response from {method} {path}")]
    EmptyResponse {
        method: Method,
        path: String,
        status: u16,
    },

    /// More than one record where at most one was expected
    #[error("ambiguous result from {method} {path}")]
    AmbiguousResult {
        method: Method,
        path: String,
        status: u16,
        count: usize,
        raw: String,
    },

    /// Response did not map onto the typed record
    #[error("failed to decode response from {method} {path}")]
    Decode {
        method: Method,
        path: String,
        status: u16,
        raw: String,
        #[source]
        source: DecodeFailure,
    },

    /// Caller supplied an insufficient identifier or argument
    #[error("invalid argument for {path}")]
    Validation { path: String, message: String },
}

impl ResourceError {
    pub fn transport(method: Method, path: &str, failure: TransportFailure) -> Self {
        Self::Transport {
            method,
            path: path.to_string(),
            status: failure.status,
            message: failure.message,
            raw: None,
        }
    }

    /// Success status whose body is not a usable envelope
    pub fn malformed(method: Method, path: &str, status: u16, malformed: MalformedEnvelope) -> Self {
        Self::Transport {
            method,
            path: path.to_string(),
            status: Some(status),
            message: malformed.to_string(),
            raw: Some(malformed.raw),
        }
    }

    pub fn ambiguous(method: Method, path: &str, status: u16, ambiguous: Ambiguous) -> Self {
        Self::AmbiguousResult {
            method,
            path: path.to_string(),
            status,
            count: ambiguous.count,
            raw: ambiguous.raw,
        }
    }

    pub fn decode(
        method: Method,
        path: &str,
        status: u16,
        record: &RawRecord,
        source: DecodeFailure,
    ) -> Self {
        Self::Decode {
            method,
            path: path.to_string(),
            status,
            raw: record_excerpt(record),
            source,
        }
    }

    pub fn validation(path: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Stable one-line description of the failure kind
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Everything needed to diagnose without re-running the request
    pub fn detail(&self) -> String {
        match self {
            Self::Transport {
                method,
                path,
                status,
                message,
                raw,
            } => {
                let mut detail = format!(
                    "error on {} {}: {}, statusCode {}",
                    method,
                    path,
                    message,
                    status_text(*status)
                );
                if let Some(raw) = raw {
                    detail.push_str(", response ");
                    detail.push_str(raw);
                }
                detail
            }
            Self::EmptyResponse {
                method,
                path,
                status,
            } => format!(
                "{} {} succeeded with statusCode {} but returned no records",
                method, path, status
            ),
            Self::AmbiguousResult {
                method,
                path,
                status,
                count,
                raw,
            } => format!(
                "{} {} returned {} records where at most one was expected, statusCode {}, response {}",
                method, path, count, status, raw
            ),
            Self::Decode {
                status,
                raw,
                source,
                ..
            } => format!("error: {}, statusCode {}, response {}", source, status, raw),
            Self::Validation { message, .. } => message.clone(),
        }
    }

    /// HTTP status involved, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::EmptyResponse { status, .. }
            | Self::AmbiguousResult { status, .. }
            | Self::Decode { status, .. } => Some(*status),
            Self::Validation { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
