//! The top-to-bottom issuance pipeline.
//!
//! Load order mirrors the configuration-driven flow: ensure the output
//! directory, generate or reuse the root CA, issue the server certificate for
//! the configured domain together with its rendered CSR configuration, then
//! issue one client certificate per configured identity.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::ca_state::{self, CaState};
use crate::configs::IssuerConfig;
use crate::generate_client_cert::ClientCertBuilder;
use crate::generate_root_ca::RsaRootCaBuilder;
use crate::generate_server_cert::ServerCertBuilder;
use crate::storage::{load_ca_credentials, CertStore};
use crate::templates::CsrTemplate;

/// Name of the rendered CSR-configuration file inside the certs directory.
pub const CSR_CONF_FILE_NAME: &str = "csr.conf";

/// Run the whole issuance sequence for the given configuration.
///
/// The `clients` list is only required once client issuance is reached; its
/// absence fails the run after the CA and server artifacts already exist.
pub fn run(config: &IssuerConfig, template_path: &Path) -> Result<()> {
    fs::create_dir_all(&config.certs_dir).with_context(|| {
        format!(
            "Failed to create certs directory {}",
            config.certs_dir.display()
        )
    })?;

    let store = CertStore::new(&config.certs_dir);
    let ca_key_name = format!("{}.key", config.ca_file_name);
    let ca_cert_name = format!("{}.crt", config.ca_file_name);
    let ca_key_path = store.path_of(&ca_key_name);
    let ca_cert_path = store.path_of(&ca_cert_name);

    match ca_state::evaluate(&ca_key_path, &ca_cert_path)? {
        CaState::Usable => {
            info!("CA files already exist. Skipping CA generation.");
        }
        CaState::Absent => {
            let (ca_key, ca_cert) = RsaRootCaBuilder::new()
                .country(config.country.clone())
                .state(config.state.clone())
                .locality(config.locality.clone())
                .build()
                .context("Failed to generate root CA")?;
            store.write_key_certificate(&ca_key_name, &ca_cert_name, &ca_key, &ca_cert)?;
            info!("Root CA generated at {}", ca_cert_path.display());
        }
    }

    // Server certificate for the configured domain, with its rendered
    // CSR-configuration document.
    let template = CsrTemplate::load(template_path)?;
    let rendered = template.render(
        &config.country,
        &config.state,
        &config.locality,
        &config.domain,
    )?;
    store.write_text(CSR_CONF_FILE_NAME, &rendered)?;

    let (ca_key, ca_cert) = load_ca_credentials(&ca_key_path, &ca_cert_path)?;
    let (server_key, server_cert) = ServerCertBuilder::new(ca_key, ca_cert)
        .domain(config.domain.clone())
        .build()
        .with_context(|| {
            format!(
                "Failed to generate server certificate for {}",
                config.domain
            )
        })?;
    store.write_key_certificate(
        &format!("{}.key", config.domain),
        &format!("{}.crt", config.domain),
        &server_key,
        &server_cert,
    )?;

    let clients = config
        .clients
        .as_deref()
        .context("Missing `clients` list in configuration")?;

    for client in clients {
        // The CA credentials are re-read for every client.
        let (ca_key, ca_cert) = load_ca_credentials(&ca_key_path, &ca_cert_path)?;
        let (client_key, client_cert) = ClientCertBuilder::new(ca_key, ca_cert)
            .client_name(client.clone())
            .build()
            .with_context(|| format!("Failed to generate client certificate for {}", client))?;
        store.write_key_certificate(
            &format!("{}.key", client),
            &format!("{}.crt", client),
            &client_key,
            &client_cert,
        )?;
        info!("Client certificate for {} generated successfully.", client);
    }

    Ok(())
}
