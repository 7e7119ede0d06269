//! Volume snapshots (`/storage/volumes/{volume_uuid}/snapshots`)

use crate::error::Result;
use crate::resource::{
    require, Comparison, Condition, DecodeFailure, FieldRule, FromRecord, RawRecord, RecordReader,
    RecordWriter, ResourceKind, ResourceOps, Scope, ToRecord, Transport, VersionInfo,
};
use serde::Serialize;

/// Collection path for the snapshots of one volume
pub fn api_path(volume_uuid: &str) -> String {
    format!(
        "/storage/volumes/{}/snapshots",
        urlencoding::encode(volume_uuid)
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeRef {
    pub uuid: String,
    pub name: Option<String>,
}

impl FromRecord for VolumeRef {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        Ok(Self {
            uuid: reader.str("uuid")?,
            name: reader.opt_str("name")?,
        })
    }
}

impl ToRecord for VolumeRef {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .str("uuid", &self.uuid)
            .opt_str("name", self.name.as_deref())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeSnapshot {
    pub uuid: String,
    pub name: String,
    pub create_time: Option<String>,
    pub expiry_time: Option<String>,
    pub comment: Option<String>,
    pub snapmirror_label: Option<String>,
    pub state: Option<String>,
    /// Bytes; only returned by 9.10 and later
    pub size: Option<i64>,
    pub volume: Option<VolumeRef>,
}

impl FromRecord for VolumeSnapshot {
    fn from_record(reader: &RecordReader<'_>) -> std::result::Result<Self, DecodeFailure> {
        Ok(Self {
            uuid: reader.str("uuid")?,
            name: reader.str("name")?,
            create_time: reader.opt_str("create_time")?,
            expiry_time: reader.opt_str("expiry_time")?,
            comment: reader.opt_str("comment")?,
            snapmirror_label: reader.opt_str("snapmirror_label")?,
            state: reader.opt_str("state")?,
            size: reader.opt_int("size")?,
            volume: reader.opt_nested("volume")?,
        })
    }
}

impl ToRecord for VolumeSnapshot {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .str("uuid", &self.uuid)
            .str("name", &self.name)
            .opt_str("create_time", self.create_time.as_deref())
            .opt_str("expiry_time", self.expiry_time.as_deref())
            .opt_str("comment", self.comment.as_deref())
            .opt_str("snapmirror_label", self.snapmirror_label.as_deref())
            .opt_str("state", self.state.as_deref())
            .opt_int("size", self.size)
            .opt_nested("volume", self.volume.as_ref())
            .finish()
    }
}

/// POST body for a new snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeSnapshotBody {
    pub name: String,
    pub comment: Option<String>,
    pub expiry_time: Option<String>,
    pub snapmirror_label: Option<String>,
}

impl ToRecord for VolumeSnapshotBody {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .str("name", &self.name)
            .opt_str("comment", self.comment.as_deref())
            .opt_str("expiry_time", self.expiry_time.as_deref())
            .opt_str("snapmirror_label", self.snapmirror_label.as_deref())
            .finish()
    }
}

/// PATCH body; only the set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeSnapshotPatch {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub expiry_time: Option<String>,
    pub snapmirror_label: Option<String>,
}

impl VolumeSnapshotPatch {
    pub fn is_empty(&self) -> bool {
        self.to_record().is_empty()
    }
}

impl ToRecord for VolumeSnapshotPatch {
    fn to_record(&self) -> RawRecord {
        RecordWriter::new()
            .opt_str("name", self.name.as_deref())
            .opt_str("comment", self.comment.as_deref())
            .opt_str("expiry_time", self.expiry_time.as_deref())
            .opt_str("snapmirror_label", self.snapmirror_label.as_deref())
            .finish()
    }
}

pub struct VolumeSnapshots;

impl ResourceKind for VolumeSnapshots {
    type Record = VolumeSnapshot;
    const NAME: &'static str = "snapshot";
    const BASE_FIELDS: &'static [&'static str] = &[
        "uuid",
        "name",
        "create_time",
        "expiry_time",
        "state",
        "comment",
        "snapmirror_label",
        "volume",
    ];
    const FIELD_RULES: &'static [FieldRule] = &[FieldRule::new(
        "size",
        &[
            Condition::generation(Comparison::Eq, 9),
            Condition::major(Comparison::Ge, 10),
        ],
    )];
}

fn ops<'t>(
    transport: &'t dyn Transport,
    volume_uuid: Option<&str>,
) -> Result<ResourceOps<'t, VolumeSnapshots>> {
    let volume_uuid = require("/storage/volumes", "Volume UUID", volume_uuid)?;
    Ok(ResourceOps::new(transport, api_path(volume_uuid)))
}

/// Snapshot `name` of volume `volume_uuid`; both are required
pub async fn get_volume_snapshot(
    transport: &dyn Transport,
    volume_uuid: Option<&str>,
    name: Option<&str>,
    version: &VersionInfo,
) -> Result<Option<VolumeSnapshot>> {
    let ops = ops(transport, volume_uuid)?;
    let name = require(ops.path(), "Snapshot name", name)?;
    ops.get(&[("name", name)], &Scope::Unscoped, version).await
}

pub async fn create_volume_snapshot(
    transport: &dyn Transport,
    volume_uuid: Option<&str>,
    body: &VolumeSnapshotBody,
) -> Result<VolumeSnapshot> {
    let ops = ops(transport, volume_uuid)?;
    require(ops.path(), "Snapshot name", Some(body.name.as_str()))?;
    ops.create(body).await
}

pub async fn update_volume_snapshot(
    transport: &dyn Transport,
    volume_uuid: Option<&str>,
    uuid: Option<&str>,
    patch: &VolumeSnapshotPatch,
) -> Result<()> {
    let ops = ops(transport, volume_uuid)?;
    if patch.is_empty() {
        tracing::debug!("empty snapshot patch for {:?}, nothing to send", uuid);
        require(ops.path(), "snapshot UUID", uuid)?;
        return Ok(());
    }
    ops.update(uuid, patch).await
}

pub async fn delete_volume_snapshot(
    transport: &dyn Transport,
    volume_uuid: Option<&str>,
    uuid: Option<&str>,
) -> Result<()> {
    ops(transport, volume_uuid)?.delete(uuid).await
}
