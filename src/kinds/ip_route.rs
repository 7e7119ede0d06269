//! Network IP routes (`/network/ip/routes`)

use crate::error::Result;
use crate::resource::{
    Comparison, Condition, DecodeFailure, FieldRule, FromRecord, RawRecord, RecordReader,
    RecordWriter, ResourceKind, ResourceOps, Scope, ToRecord, Transport, VersionInfo,
};
use serde::Serialize;

pub const API_PATH: &str = "/network/ip/routes";

/// Route destination: address plus netmask length or mask
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub address: String,
    pub netmask: String,
}

impl FromRecord for Destination {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        Ok(Self {
            address: reader.str("address")?,
            netmask: reader.str("netmask")?,
        })
    }
}

impl ToRecord for Destination {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .str("address", &self.address)
            .str("netmask", &self.netmask)
            .finish()
    }
}

/// Reference to the owning SVM
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SvmRef {
    pub name: String,
}

impl FromRecord for SvmRef {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        Ok(Self {
            name: reader.str("name")?,
        })
    }
}

impl ToRecord for SvmRef {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new().str("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpRoute {
    pub uuid: String,
    pub destination: Destination,
    pub gateway: String,
    /// Only returned by 9.11 and later
    pub metric: Option<i64>,
    pub scope: Option<String>,
    pub svm: Option<SvmRef>,
}

impl FromRecord for IpRoute {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        Ok(Self {
            uuid: reader.str("uuid")?,
            destination: reader.nested("destination")?,
            gateway: reader.str("gateway")?,
            metric: reader.opt_int("metric")?,
            scope: reader.opt_str("scope")?,
            svm: reader.opt_nested("svm")?,
        })
    }
}

impl ToRecord for IpRoute {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .str("uuid", &self.uuid)
            .nested("destination", &self.destination)
            .str("gateway", &self.gateway)
            .opt_int("metric", self.metric)
            .opt_str("scope", self.scope.as_deref())
            .opt_nested("svm", self.svm.as_ref())
            .finish()
    }
}

/// POST body for a new route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRouteBody {
    pub destination: Destination,
    pub svm: Option<SvmRef>,
    pub gateway: Option<String>,
    pub metric: Option<i64>,
}

impl ToRecord for IpRouteBody {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .nested("destination", &self.destination)
            .opt_nested("svm", self.svm.as_ref())
            .opt_str("gateway", self.gateway.as_deref())
            .opt_int("metric", self.metric)
            .finish()
    }
}

pub struct IpRoutes;

impl ResourceKind for IpRoutes {
    type Record = IpRoute;
    const NAME: &'static str = "ip_route";
    const BASE_FIELDS: &'static [&'static str] =
        &["uuid", "destination", "svm.name", "gateway", "scope"];
    const FIELD_RULES: &'static [FieldRule] = &[FieldRule::new(
        "metric",
        &[
            Condition::generation(Comparison::Eq, 9),
            Condition::major(Comparison::Gt, 10),
        ],
    )];
}

fn ops(transport: &dyn Transport) -> ResourceOps<'_, IpRoutes> {
    ResourceOps::new(transport, API_PATH)
}

/// Route to `destination`, scoped to `svm_name` or cluster-wide when absent
pub async fn get_ip_route(
    transport: &dyn Transport,
    destination: &str,
    svm_name: Option<&str>,
    version: &VersionInfo,
) -> Result<Option<IpRoute>> {
    ops(transport)
        .get(
            &[("destination.address", destination)],
            &Scope::for_svm(svm_name),
            version,
        )
        .await
}

pub async fn get_ip_route_by_uuid(
    transport: &dyn Transport,
    uuid: Option<&str>,
    version: &VersionInfo,
) -> Result<Option<IpRoute>> {
    ops(transport).get_by_uuid(uuid, version).await
}

pub async fn list_ip_routes(
    transport: &dyn Transport,
    svm_name: Option<&str>,
    version: &VersionInfo,
) -> Result<Vec<IpRoute>> {
    ops(transport)
        .list(&[], &Scope::for_svm(svm_name), version)
        .await
}

pub async fn create_ip_route(transport: &dyn Transport, body: &IpRouteBody) -> Result<IpRoute> {
    let route = ops(transport).create(body).await?;
    tracing::debug!("created ip_route {}", route.uuid);
    Ok(route)
}

pub async fn delete_ip_route(transport: &dyn Transport, uuid: Option<&str>) -> Result<()> {
    ops(transport).delete(uuid).await
}
