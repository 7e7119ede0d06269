//! Resource Operations
//!
//! Generic `get`/`list`/`create`/`update`/`delete` over any [`ResourceKind`].
//! Each call is one request: build the query, gate the projection, call the
//! transport, resolve cardinality, decode.

use super::cardinality::{resolve_zero_or_one, ResponseEnvelope};
use super::decode::{decode, FromRecord, RawRecord, ToRecord};
use super::query::Query;
use super::transport::{Method, RestResponse, Transport};
use super::version::{resolve_fields, FieldRule, VersionInfo};
use crate::error::{ResourceError, Result};
use std::marker::PhantomData;

/// Static description of a resource kind
pub trait ResourceKind {
    type Record: FromRecord + std::fmt::Debug + Send;

    /// Short name used in validation messages (e.g. `ip_route`)
    const NAME: &'static str;

    /// Fields every supported cluster version returns
    const BASE_FIELDS: &'static [&'static str];

    /// Version-gated additions to `BASE_FIELDS`
    const FIELD_RULES: &'static [FieldRule] = &[];

    fn fields_for(version: &VersionInfo) -> Vec<String> {
        resolve_fields(Self::BASE_FIELDS, version, Self::FIELD_RULES)
    }
}

/// Scope of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// `scope=cluster`
    Cluster,
    /// `svm.name=<name>&scope=svm`
    Svm(String),
    /// The path itself scopes the collection
    Unscoped,
}

impl Scope {
    /// An absent or empty SVM name means cluster-wide
    pub fn for_svm(svm_name: Option<&str>) -> Self {
        match svm_name {
            Some(name) if !name.is_empty() => Scope::Svm(name.to_string()),
            _ => Scope::Cluster,
        }
    }

    pub fn apply(&self, query: &mut Query) {
        match self {
            Scope::Cluster => {
                query.set("scope", "cluster");
            }
            Scope::Svm(name) => {
                query.set("svm.name", name.as_str());
                query.set("scope", "svm");
            }
            Scope::Unscoped => {}
        }
    }
}

/// Reject an absent or empty identifier before anything is sent
pub fn require<'a>(path: &str, what: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ResourceError::validation(path, format!("{} is null", what))),
    }
}

/// Operations for one resource kind at one collection path
pub struct ResourceOps<'t, K> {
    transport: &'t dyn Transport,
    path: String,
    _kind: PhantomData<fn() -> K>,
}

impl<'t, K: ResourceKind> ResourceOps<'t, K> {
    pub fn new(transport: &'t dyn Transport, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            _kind: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, urlencoding::encode(id))
    }

    fn read_query(&self, identity: &[(&str, &str)], scope: &Scope, version: &VersionInfo) -> Query {
        let mut query = Query::new();
        for (key, value) in identity {
            query.set(key, *value);
        }
        scope.apply(&mut query);
        query.fields(K::fields_for(version));
        query
    }

    fn envelope(&self, method: Method, path: &str, response: RestResponse) -> Result<ResponseEnvelope> {
        let status = response.status;
        ResponseEnvelope::parse(response.body).map_err(|e| ResourceError::malformed(method, path, status, e))
    }

    fn decode_one(&self, method: Method, path: &str, status: u16, raw: &RawRecord) -> Result<K::Record> {
        let record = decode::<K::Record>(raw)
            .map_err(|e| ResourceError::decode(method, path, status, raw, e))?;
        tracing::debug!("{} {} decoded {}: {:?}", method, path, K::NAME, record);
        Ok(record)
    }

    /// Zero-or-one read keyed by identity filters. Absence is `Ok(None)`.
    pub async fn get(
        &self,
        identity: &[(&str, &str)],
        scope: &Scope,
        version: &VersionInfo,
    ) -> Result<Option<K::Record>> {
        let query = self.read_query(identity, scope, version);
        let response = self
            .transport
            .get(&self.path, &query)
            .await
            .map_err(|f| ResourceError::transport(Method::Get, &self.path, f))?;

        let status = response.status;
        let envelope = self.envelope(Method::Get, &self.path, response)?;
        let record = resolve_zero_or_one(envelope)
            .map_err(|a| ResourceError::ambiguous(Method::Get, &self.path, status, a))?;

        match record {
            Some(raw) => self.decode_one(Method::Get, &self.path, status, &raw).map(Some),
            None => {
                tracing::debug!("GET {} matched no {} record", self.path, K::NAME);
                Ok(None)
            }
        }
    }

    /// Read one record by identifier. A 404 counts as absence.
    pub async fn get_by_uuid(&self, uuid: Option<&str>, version: &VersionInfo) -> Result<Option<K::Record>> {
        let uuid = require(&self.path, &format!("{} UUID", K::NAME), uuid)?;
        let path = self.item_path(uuid);
        let query = self.read_query(&[], &Scope::Unscoped, version);

        let response = match self.transport.get(&path, &query).await {
            Ok(response) => response,
            Err(failure) if failure.status == Some(404) => {
                tracing::debug!("GET {} returned 404, treating as absent", path);
                return Ok(None);
            }
            Err(failure) => return Err(ResourceError::transport(Method::Get, &path, failure)),
        };

        let status = response.status;
        let envelope = self.envelope(Method::Get, &path, response)?;
        let record = resolve_zero_or_one(envelope)
            .map_err(|a| ResourceError::ambiguous(Method::Get, &path, status, a))?;

        record
            .map(|raw| self.decode_one(Method::Get, &path, status, &raw))
            .transpose()
    }

    /// Zero-or-more read. Every record must decode.
    pub async fn list(
        &self,
        filters: &[(&str, &str)],
        scope: &Scope,
        version: &VersionInfo,
    ) -> Result<Vec<K::Record>> {
        let query = self.read_query(filters, scope, version);
        let response = self
            .transport
            .get(&self.path, &query)
            .await
            .map_err(|f| ResourceError::transport(Method::Get, &self.path, f))?;

        let status = response.status;
        self.envelope(Method::Get, &self.path, response)?
            .into_records()
            .iter()
            .map(|raw| self.decode_one(Method::Get, &self.path, status, raw))
            .collect()
    }

    /// POST with `return_records=true`; the first echoed record is returned
    pub async fn create<B: ToRecord>(&self, body: &B) -> Result<K::Record> {
        let body = body.to_record();
        let mut query = Query::new();
        query.add("return_records", "true");

        let response = self
            .transport
            .post(&self.path, &query, &body)
            .await
            .map_err(|f| ResourceError::transport(Method::Post, &self.path, f))?;

        let status = response.status;
        let envelope = self.envelope(Method::Post, &self.path, response)?;
        if envelope.len() > 1 {
            tracing::debug!(
                "POST {} echoed {} records, using the first",
                self.path,
                envelope.len()
            );
        }

        let Some(raw) = envelope.into_first() else {
            return Err(ResourceError::EmptyResponse {
                method: Method::Post,
                path: self.path.clone(),
                status,
            });
        };

        self.decode_one(Method::Post, &self.path, status, &raw)
    }

    /// PATCH an existing record; success carries no records
    pub async fn update<B: ToRecord>(&self, uuid: Option<&str>, body: &B) -> Result<()> {
        let uuid = require(&self.path, &format!("{} UUID", K::NAME), uuid)?;
        let path = self.item_path(uuid);
        let body = body.to_record();

        let response = self
            .transport
            .patch(&path, &Query::new(), &body)
            .await
            .map_err(|f| ResourceError::transport(Method::Patch, &path, f))?;

        tracing::debug!("PATCH {} updated {}, statusCode {}", path, K::NAME, response.status);
        Ok(())
    }

    pub async fn delete(&self, uuid: Option<&str>) -> Result<()> {
        let uuid = require(&self.path, &format!("{} UUID", K::NAME), uuid)?;
        let path = self.item_path(uuid);

        let response = self
            .transport
            .delete(&path, &Query::new())
            .await
            .map_err(|f| ResourceError::transport(Method::Delete, &path, f))?;

        tracing::debug!("DELETE {} removed {}, statusCode {}", path, K::NAME, response.status);
        Ok(())
    }
}
