//! Resource kinds
//!
//! Each module pairs typed records with a [`crate::resource::ResourceKind`]
//! table and exposes the domain-level operations callers use.
//!
//! - [`cluster`] - Cluster identity and version discovery
//! - [`ip_route`] - `network/ip/routes`
//! - [`volume_snapshot`] - `storage/volumes/{uuid}/snapshots`

pub mod cluster;
pub mod ip_route;
pub mod volume_snapshot;

use crate::resource::{ResourceKind, VersionInfo};

/// Kind keys accepted by [`fields_for_kind`]
pub const KIND_KEYS: &[&str] = &["cluster", "ip_route", "snapshot"];

/// Field projection a kind would request from a cluster at `version`
pub fn fields_for_kind(key: &str, version: &VersionInfo) -> Option<Vec<String>> {
    match key {
        "cluster" => Some(cluster::Clusters::fields_for(version)),
        "ip_route" => Some(ip_route::IpRoutes::fields_for(version)),
        "snapshot" => Some(volume_snapshot::VolumeSnapshots::fields_for(version)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_key_resolves() {
        let version = VersionInfo::new(9, 13, 1);
        for key in KIND_KEYS {
            assert!(fields_for_kind(key, &version).is_some(), "{} should resolve", key);
        }
        assert!(fields_for_kind("lun", &version).is_none());
    }

    #[test]
    fn test_route_metric_gate() {
        let fields = fields_for_kind("ip_route", &VersionInfo::new(9, 11, 0)).unwrap();
        assert_eq!(fields.iter().filter(|f| *f == "metric").count(), 1);

        let fields = fields_for_kind("ip_route", &VersionInfo::new(9, 8, 0)).unwrap();
        assert!(!fields.iter().any(|f| f == "metric"));
    }
}
