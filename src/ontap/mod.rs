//! ONTAP API interaction module
//!
//! Concrete transport for the cluster REST API.
//!
//! # Module Structure
//!
//! - [`client`] - Main client; implements [`crate::resource::Transport`]
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use ontap_rest::config::Config;
//! use ontap_rest::ontap::OntapClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let client = OntapClient::new(config.profile(Some("lab"))?)?;
//!     let version = client.cluster_version().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;

pub use client::OntapClient;
