//! localca - Local Certificate Authority Bootstrap
//!
//! Builds a local root CA and issues leaf certificates signed by it, driven
//! by a YAML configuration file and a CSR-configuration template.
//!
//! # Issued Hierarchy
//!
//! ```text
//! Root CA (self-signed, serial 1)
//!   ├── Server certificate for the configured domain (serial 2)
//!   └── Client certificates, one per configured identity (serial 3)
//! ```
//!
//! # Module Overview
//!
//! - [`configs`]: YAML configuration loading with per-key defaults
//! - [`ca_state`]: decides whether the on-disk CA can be reused
//! - [`generate_root_ca`]: self-signed root CA generation
//! - [`generate_server_cert`]: server certificate generation (CSR + signing)
//! - [`generate_client_cert`]: client certificate generation
//! - [`templates`]: CSR-configuration template rendering
//! - [`storage`]: PEM persistence with all-or-nothing pair commits
//! - [`issuance`]: the sequential pipeline tying the steps together
//!
//! # Example
//!
//! ```no_run
//! use localca::configs::IssuerConfig;
//! use localca::issuance;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = IssuerConfig::from_file(Path::new("config.yml"))?;
//!     issuance::run(&config, Path::new("templates/csr_template.conf.j2"))?;
//!     Ok(())
//! }
//! ```

pub mod ca_state;
pub mod configs;
pub mod generate_client_cert;
pub mod generate_root_ca;
pub mod generate_server_cert;
pub mod issuance;
pub mod storage;
pub mod templates;
