//! Resource mapping layer
//!
//! A generic framework shared by every resource kind: one place for query
//! construction, version gating, cardinality handling and decoding, instead
//! of one hand-written copy per endpoint.
//!
//! # Architecture
//!
//! - [`query`] - Filter and field-projection builder
//! - [`version`] - Version-gated field tables
//! - [`decode`] - Explicit record readers/writers
//! - [`cardinality`] - Envelope parsing and zero-or-one resolution
//! - [`transport`] - The REST capability the layer consumes
//! - [`operations`] - `get`/`list`/`create`/`update`/`delete` per [`ResourceKind`]
//!
//! # Example
//!
//! ```ignore
//! use ontap_rest::kinds::ip_route::IpRoutes;
//! use ontap_rest::resource::{ResourceOps, Scope};
//!
//! async fn example(client: &ontap_rest::ontap::OntapClient) -> ontap_rest::Result<()> {
//!     let version = client.cluster_version().await?;
//!     let ops = ResourceOps::<IpRoutes>::new(client, "/network/ip/routes");
//!     let route = ops
//!         .get(&[("destination.address", "10.0.0.0")], &Scope::Cluster, &version)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod cardinality;
pub mod decode;
pub mod operations;
pub mod query;
pub mod transport;
pub mod version;

pub use cardinality::{resolve_zero_or_one, ResponseEnvelope};
pub use decode::{decode, DecodeFailure, FromRecord, RawRecord, RecordReader, RecordWriter, ToRecord};
pub use operations::{require, ResourceKind, ResourceOps, Scope};
pub use query::Query;
pub use transport::{Method, RestResponse, Transport, TransportFailure};
pub use version::{resolve_fields, Comparison, Condition, FieldRule, VersionInfo, VersionPart};
