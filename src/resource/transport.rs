//! Transport seam
//!
//! The core only needs four verbs against an API path. [`crate::ontap::OntapClient`]
//! implements them over HTTPS; tests substitute an in-memory fake.

use super::decode::RawRecord;
use super::query::Query;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Progressive verb used in diagnostic summaries
    pub fn verb(self) -> &'static str {
        match self {
            Method::Get => "reading",
            Method::Post => "creating",
            Method::Patch => "updating",
            Method::Delete => "deleting",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Successful response: status plus parsed body (`Value::Null` when empty)
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    pub status: u16,
    pub body: Value,
}

impl RestResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Failed call. `status` is `None` when no response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportFailure {}

/// REST capability consumed by resource operations
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &Query) -> Result<RestResponse, TransportFailure>;

    async fn post(
        &self,
        path: &str,
        query: &Query,
        body: &RawRecord,
    ) -> Result<RestResponse, TransportFailure>;

    async fn patch(
        &self,
        path: &str,
        query: &Query,
        body: &RawRecord,
    ) -> Result<RestResponse, TransportFailure>;

    async fn delete(&self, path: &str, query: &Query) -> Result<RestResponse, TransportFailure>;
}
