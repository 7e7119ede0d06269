//! In-memory transport for unit tests

use crate::resource::decode::RawRecord;
use crate::resource::query::Query;
use crate::resource::transport::{Method, RestResponse, Transport, TransportFailure};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub body: Option<Value>,
}

/// Replays queued outcomes in order and records every call. With nothing
/// queued it answers `200` with an empty body.
#[derive(Default)]
pub struct RecordingTransport {
    outcomes: Mutex<VecDeque<Result<RestResponse, TransportFailure>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, body: Value) {
        self.respond_with_status(200, body);
    }

    pub fn respond_with_status(&self, status: u16, body: Value) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(RestResponse::new(status, body)));
    }

    pub fn fail(&self, failure: TransportFailure) {
        self.outcomes.lock().unwrap().push_back(Err(failure));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transport call recorded")
    }

    fn record(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&RawRecord>,
    ) -> Result<RestResponse, TransportFailure> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.to_query_string(),
            body: body.map(|b| Value::Object(b.clone())),
        });
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RestResponse::new(200, Value::Null)))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, path: &str, query: &Query) -> Result<RestResponse, TransportFailure> {
        self.record(Method::Get, path, query, None)
    }

    async fn post(
        &self,
        path: &str,
        query: &Query,
        body: &RawRecord,
    ) -> Result<RestResponse, TransportFailure> {
        self.record(Method::Post, path, query, Some(body))
    }

    async fn patch(
        &self,
        path: &str,
        query: &Query,
        body: &RawRecord,
    ) -> Result<RestResponse, TransportFailure> {
        self.record(Method::Patch, path, query, Some(body))
    }

    async fn delete(&self, path: &str, query: &Query) -> Result<RestResponse, TransportFailure> {
        self.record(Method::Delete, path, query, None)
    }
}
