//! ONTAP Client
//!
//! Main client for the cluster REST API. Implements [`Transport`] on top of
//! [`OntapHttpClient`] and caches the cluster version for its lifetime.

use super::http::OntapHttpClient;
use crate::config::ConnectionProfile;
use crate::error::{excerpt, Result as ResourceResult};
use crate::kinds::cluster::get_cluster;
use crate::resource::cardinality::RECORDS_KEY;
use crate::resource::decode::RawRecord;
use crate::resource::query::Query;
use crate::resource::transport::{Method, RestResponse, Transport, TransportFailure};
use crate::resource::version::VersionInfo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

/// Upper bound on `_links.next` hops for one read
const MAX_PAGES: usize = 1000;

/// Main ONTAP client
#[derive(Clone)]
pub struct OntapClient {
    pub profile_name: String,
    base_url: Url,
    http: OntapHttpClient,
    version: Arc<OnceCell<VersionInfo>>,
}

impl OntapClient {
    /// Create a client for a connection profile
    pub fn new(profile: &ConnectionProfile) -> Result<Self> {
        let base_url = profile.api_base()?;
        let password = profile.resolve_password()?;
        let http = OntapHttpClient::new(&profile.username, &password, profile.validate_certs)
            .with_context(|| format!("Failed to set up client for profile '{}'", profile.name))?;

        tracing::info!("Using profile {} at {}", profile.name, base_url);

        Ok(Self {
            profile_name: profile.name.clone(),
            base_url,
            http,
            version: Arc::new(OnceCell::new()),
        })
    }

    /// Build a full API URL for a resource path such as `/network/ip/routes`
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Cluster version, fetched once and shared by every clone of this client
    pub async fn cluster_version(&self) -> ResourceResult<VersionInfo> {
        self.version
            .get_or_try_init(|| async { get_cluster(self).await.map(|c| c.version) })
            .await
            .copied()
    }

    fn next_link(&self, body: &Value) -> Option<String> {
        let href = body
            .get("_links")
            .and_then(|l| l.get("next"))
            .and_then(|n| n.get("href"))
            .and_then(|h| h.as_str())?;
        self.base_url.join(href).ok().map(String::from)
    }

    /// GET following `_links.next` and merging every page's records
    async fn get_all_pages(&self, url: String) -> std::result::Result<RestResponse, TransportFailure> {
        let first = self.http.send(Method::Get, &url, None).await?;
        let Some(mut next) = self.next_link(&first.body) else {
            return Ok(first);
        };

        let status = first.status;
        let mut records = take_records(first.body, first.status, &url)?;
        let mut pages = 1;

        loop {
            if pages >= MAX_PAGES {
                return Err(TransportFailure::new(
                    Some(status),
                    format!("pagination exceeded {} pages at {}", MAX_PAGES, next),
                ));
            }

            let page = self.http.send(Method::Get, &next, None).await?;
            pages += 1;
            let following = self.next_link(&page.body);
            records.extend(take_records(page.body, page.status, &next)?);

            match following {
                Some(link) if link != next => next = link,
                _ => break,
            }
        }

        tracing::debug!("merged {} records from {} pages", records.len(), pages);
        Ok(RestResponse::new(
            status,
            serde_json::json!({ "num_records": records.len(), "records": records }),
        ))
    }
}

/// Records of one page; every page of a paginated read must carry them
fn take_records(mut body: Value, status: u16, url: &str) -> std::result::Result<Vec<Value>, TransportFailure> {
    let reason = match body.get_mut(RECORDS_KEY).map(Value::take) {
        Some(Value::Array(items)) => return Ok(items),
        Some(other) => format!("'{}' is not an array, response {}", RECORDS_KEY, excerpt(&other.to_string())),
        None => format!("'{}' is missing, response {}", RECORDS_KEY, excerpt(&body.to_string())),
    };
    Err(TransportFailure::new(
        Some(status),
        format!("malformed page from {}: {}", url, reason),
    ))
}

#[async_trait]
impl Transport for OntapClient {
    async fn get(&self, path: &str, query: &Query) -> std::result::Result<RestResponse, TransportFailure> {
        self.get_all_pages(query.append_to(&self.api_url(path))).await
    }

    async fn post(
        &self,
        path: &str,
        query: &Query,
        body: &RawRecord,
    ) -> std::result::Result<RestResponse, TransportFailure> {
        let body = Value::Object(body.clone());
        self.http
            .send(Method::Post, &query.append_to(&self.api_url(path)), Some(&body))
            .await
    }

    async fn patch(
        &self,
        path: &str,
        query: &Query,
        body: &RawRecord,
    ) -> std::result::Result<RestResponse, TransportFailure> {
        let body = Value::Object(body.clone());
        self.http
            .send(Method::Patch, &query.append_to(&self.api_url(path)), Some(&body))
            .await
    }

    async fn delete(&self, path: &str, query: &Query) -> std::result::Result<RestResponse, TransportFailure> {
        self.http
            .send(Method::Delete, &query.append_to(&self.api_url(path)), None)
            .await
    }
}
