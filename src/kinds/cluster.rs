//! Cluster identity and version (`/cluster`)

use crate::error::{ResourceError, Result};
use crate::resource::{
    DecodeFailure, FromRecord, Method, RecordReader, ResourceKind, ResourceOps, Scope, Transport,
    VersionInfo,
};
use serde::Serialize;

pub const API_PATH: &str = "/cluster";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub version: VersionInfo,
    /// Human-readable release string, e.g. "NetApp Release 9.13.1: ..."
    pub version_full: Option<String>,
}

impl FromRecord for VersionInfo {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        Ok(VersionInfo::new(
            reader.u32("generation")?,
            reader.u32("major")?,
            reader.u32("minor")?,
        ))
    }
}

impl FromRecord for Cluster {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        let version = reader.child("version")?;
        Ok(Self {
            name: reader.opt_str("name")?,
            uuid: reader.opt_str("uuid")?,
            version: VersionInfo::from_record(&version)?,
            version_full: version.opt_str("full")?,
        })
    }
}

pub struct Clusters;

impl ResourceKind for Clusters {
    type Record = Cluster;
    const NAME: &'static str = "cluster";
    const BASE_FIELDS: &'static [&'static str] = &["name", "uuid", "version"];
}

/// Fetch cluster identity. The version is not known yet, so the projection
/// uses base fields only.
pub async fn get_cluster(transport: &dyn Transport) -> Result<Cluster> {
    let ops = ResourceOps::<Clusters>::new(transport, API_PATH);
    let cluster = ops
        .get(&[], &Scope::Unscoped, &VersionInfo::default())
        .await?
        .ok_or_else(|| ResourceError::EmptyResponse {
            method: Method::Get,
            path: API_PATH.to_string(),
            status: 200,
        })?;

    tracing::info!(
        "connected to cluster {} running {}",
        cluster.name.as_deref().unwrap_or("-"),
        cluster.version
    );
    Ok(cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_cluster_version() {
        let transport = RecordingTransport::new();
        transport.respond(json!({
            "name": "cluster1",
            "uuid": "1cd8a442-86d1-11e0-ae1c-123478563412",
            "version": {
                "full": "NetApp Release 9.13.1: Tue Jun 20 2023",
                "generation": 9,
                "major": 13,
                "minor": 1
            }
        }));

        let cluster = get_cluster(&transport).await.unwrap();
        assert_eq!(cluster.version, VersionInfo::new(9, 13, 1));
        assert_eq!(cluster.name.as_deref(), Some("cluster1"));
        assert!(cluster.version_full.unwrap().starts_with("NetApp Release 9.13.1"));
        assert_eq!(transport.last_call().query, "fields=name%2Cuuid%2Cversion");
    }

    #[tokio::test]
    async fn test_empty_cluster_response_is_an_error() {
        let transport = RecordingTransport::new();
        transport.respond(serde_json::Value::Null);
        let err = get_cluster(&transport).await.unwrap_err();
        assert!(matches!(err, ResourceError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_missing_version_fails_decode() {
        let transport = RecordingTransport::new();
        transport.respond(json!({"name": "cluster1"}));
        let err = get_cluster(&transport).await.unwrap_err();
        assert!(matches!(err, ResourceError::Decode { .. }));
        assert!(err.detail().contains("missing required field 'version'"));
    }
}
