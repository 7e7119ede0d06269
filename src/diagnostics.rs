//! Diagnostics
//!
//! Boundary adapter that turns a [`ResourceError`] into whatever the calling
//! layer reports. Errors are passed explicitly; [`Diagnostics`] is a plain
//! value the caller owns.

use crate::error::ResourceError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// User-facing guidance for common HTTP statuses
pub fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Authentication failed. Check the profile's username and password."),
        403 => Some("Permission denied. Check the account's role on the cluster."),
        404 => Some("Resource not found."),
        409 => Some("Resource conflict. The resource may already exist or be in use."),
        429 => Some("Rate limit exceeded. Please try again later."),
        400 => Some("Invalid request. Check your parameters."),
        500..=599 => Some("Cluster API temporarily unavailable. Please try again."),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            hint: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary, detail)
        }
    }
}

impl From<&ResourceError> for Diagnostic {
    fn from(err: &ResourceError) -> Self {
        Self {
            hint: err.status().and_then(status_hint),
            ..Self::error(err.summary(), err.detail())
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}\n  {}", label, self.summary, self.detail)?;
        if let Some(hint) = self.hint {
            write!(f, "\n  {}", hint)?;
        }
        Ok(())
    }
}

/// Collected diagnostics for one invocation
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record an error, handing it back for propagation
    pub fn report(&mut self, err: ResourceError) -> ResourceError {
        let diagnostic = Diagnostic::from(&err);
        tracing::error!("{}: {}", diagnostic.summary, diagnostic.detail);
        self.entries.push(diagnostic);
        err
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        let diagnostic = Diagnostic::warning(summary, detail);
        tracing::warn!("{}: {}", diagnostic.summary, diagnostic.detail);
        self.entries.push(diagnostic);
    }

    pub fn has_error(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Method, TransportFailure};

    #[test]
    fn test_report_keeps_summary_detail_and_hint() {
        let mut diags = Diagnostics::new();
        let err = ResourceError::transport(
            Method::Post,
            "/network/ip/routes",
            TransportFailure::new(Some(409), "duplicate entry (code 1)"),
        );

        let err = diags.report(err);
        assert!(matches!(err, ResourceError::Transport { .. }));
        assert!(diags.has_error());

        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "error creating /network/ip/routes");
        assert!(diag.detail.contains("statusCode 409"));
        assert_eq!(diag.hint, status_hint(409));
    }

    #[test]
    fn test_validation_has_no_hint() {
        let diag = Diagnostic::from(&ResourceError::validation("/network/ip/routes", "ip_route UUID is null"));
        assert_eq!(diag.hint, None);
        assert_eq!(diag.detail, "ip_route UUID is null");
        assert_eq!(
            diag.to_string(),
            "Error: invalid argument for /network/ip/routes\n  ip_route UUID is null"
        );
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.add_warning("no route found", "destination 10.0.0.0 not found");
        diags.add_warning("No snapshot found", "snapshot s1 not found on volume v1");
        assert!(!diags.is_empty());
        assert!(!diags.has_error());
        assert_eq!(
            diags.iter().last().unwrap().to_string(),
            "Warning: No snapshot found\n  snapshot s1 not found on volume v1"
        );

        diags.report(ResourceError::validation("/storage/volumes", "Volume UUID is null"));
        assert!(diags.has_error());
    }

    #[test]
    fn test_status_hints() {
        assert!(status_hint(503).is_some());
        assert!(status_hint(401).unwrap().contains("Authentication"));
        assert_eq!(status_hint(200), None);
    }
}
