//! Monitoring plugin checks for Elasticsearch.
//!
//! This crate queries the administrative APIs of an Elasticsearch cluster
//! (ILM, SLM, index settings, transforms) and turns their state into a
//! Nagios-style verdict: a status, message lines and performance data.
//!
//! # Example
//!
//! ```rust,ignore
//! use check_elasticsearch::{CheckEs, ConnectionSettings, Monitor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = ConnectionSettings {
//!         url: "https://es.example.com:9200".into(),
//!         username: "monitoring".into(),
//!         password: "secret".into(),
//!         skip_tls_verify: false,
//!     };
//!     let checks = CheckEs::connect(&settings).await?;
//!
//!     let monitoring = checks.check_ilm_error("_all", &[]).await?;
//!     println!("{monitoring}");
//!     std::process::exit(monitoring.exit_code());
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod checks;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod monitoring;

pub use checks::{CheckEs, Monitor};
pub use client::ElasticsearchClient;
pub use config::{ConnectionSettings, PartialSettings};
pub use error::CheckError;
pub use monitoring::{Monitoring, Perfdata, Status};
