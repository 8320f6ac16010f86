//! Server Certificate Generation Module
//!
//! Generates the server key/certificate pair for the configured domain,
//! signed by the root CA.
//!
//! The builder first constructs an X.509 signing request self-signed with the
//! fresh server key. The request is never submitted anywhere; its public key
//! is lifted directly into the final certificate, mirroring the usual
//! CSR-then-sign shape without an external CA round trip.
//!
//! # Certificate Properties
//! - **Subject**: common name = domain
//! - **Issuer**: the root CA's subject
//! - **Key Size**: RSA 2048-bit
//! - **Serial Number**: 2
//! - **Validity**: 7500 days from generation time
//! - **Signature Algorithm**: SHA-256 with RSA

use anyhow::{anyhow, Result};
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::x509::{X509Req, X509};

const RSA_KEY_SIZE: u32 = 2048;
const SERVER_CERT_SERIAL: u32 = 2;
const VALIDITY_DAYS: u32 = 7500;

// ================= Server Certificate Builder =================

/// Builder for generating an RSA key pair and a server certificate signed by
/// the root CA
///
/// The CA's private key and certificate must be provided when creating the
/// builder; the issuer name is taken from the CA certificate's subject.
pub struct ServerCertBuilder {
    domain: String,
    signing_key: PKey<Private>,
    signing_cert: X509,
}

impl ServerCertBuilder {
    /// Create a new server certificate builder
    ///
    /// # Arguments
    /// * `ca_key` - Root CA's private key for signing
    /// * `ca_cert` - Root CA's certificate (issuer information)
    pub fn new(ca_key: PKey<Private>, ca_cert: X509) -> Self {
        Self {
            domain: String::new(),
            signing_key: ca_key,
            signing_cert: ca_cert,
        }
    }

    /// Set the domain used as the certificate's common name (CN)
    pub fn domain(mut self, domain: String) -> Self {
        self.domain = domain;
        self
    }

    /// Build the RSA key pair and CA-signed server certificate
    ///
    /// # Returns
    /// * `Ok((PKey<Private>, X509))` - Tuple of (server private key, signed certificate)
    /// * `Err(anyhow::Error)` - If key generation, request construction or signing fails
    pub fn build(self) -> Result<(PKey<Private>, X509)> {
        // Generate RSA key pair for the domain
        let rsa = openssl::rsa::Rsa::generate(RSA_KEY_SIZE)
            .map_err(|e| anyhow!("Failed to generate RSA keypair: {}", e))?;

        let private_key =
            PKey::from_rsa(rsa).map_err(|e| anyhow!("Failed to create private key: {}", e))?;

        let request = build_signing_request(&self.domain, &private_key)?;

        // Build the final certificate signed by the CA
        let mut builder =
            X509::builder().map_err(|e| anyhow!("Failed to create X509 builder: {}", e))?;

        let serial = BigNum::from_u32(SERVER_CERT_SERIAL)?.to_asn1_integer()?;
        builder
            .set_serial_number(&serial)
            .map_err(|e| anyhow!("Failed to set serial number: {}", e))?;

        let mut name_builder = openssl::x509::X509Name::builder()
            .map_err(|e| anyhow!("Failed to create name builder: {}", e))?;
        name_builder
            .append_entry_by_nid(openssl::nid::Nid::COMMONNAME, &self.domain)
            .map_err(|e| anyhow!("Failed to set CN: {}", e))?;
        let subject_name = name_builder.build();

        builder
            .set_subject_name(&subject_name)
            .map_err(|e| anyhow!("Failed to set subject: {}", e))?;

        // Issuer is the CA's subject
        builder
            .set_issuer_name(self.signing_cert.subject_name())
            .map_err(|e| anyhow!("Failed to set issuer from CA: {}", e))?;

        let not_before = openssl::asn1::Asn1Time::days_from_now(0)
            .map_err(|e| anyhow!("Failed to create not_before: {}", e))?;
        builder
            .set_not_before(&not_before)
            .map_err(|e| anyhow!("Failed to set not_before: {}", e))?;

        let not_after = openssl::asn1::Asn1Time::days_from_now(VALIDITY_DAYS)
            .map_err(|e| anyhow!("Failed to create not_after: {}", e))?;
        builder
            .set_not_after(&not_after)
            .map_err(|e| anyhow!("Failed to set not_after: {}", e))?;

        // Public key comes from the signing request
        let request_key = request
            .public_key()
            .map_err(|e| anyhow!("Failed to extract public key from request: {}", e))?;
        builder
            .set_pubkey(&request_key)
            .map_err(|e| anyhow!("Failed to set public key: {}", e))?;

        builder
            .sign(&self.signing_key, MessageDigest::sha256())
            .map_err(|e| anyhow!("Failed to sign certificate: {}", e))?;

        let x509 = builder.build();
        Ok((private_key, x509))
    }
}

/// Build an X.509 signing request with the given common name, self-signed
/// with the subject's own key.
fn build_signing_request(common_name: &str, key: &PKey<Private>) -> Result<X509Req> {
    let mut req_builder =
        X509Req::builder().map_err(|e| anyhow!("Failed to create request builder: {}", e))?;

    let mut name_builder = openssl::x509::X509Name::builder()
        .map_err(|e| anyhow!("Failed to create name builder: {}", e))?;
    name_builder
        .append_entry_by_nid(openssl::nid::Nid::COMMONNAME, common_name)
        .map_err(|e| anyhow!("Failed to set CN: {}", e))?;
    let name = name_builder.build();

    req_builder
        .set_subject_name(&name)
        .map_err(|e| anyhow!("Failed to set request subject: {}", e))?;
    req_builder
        .set_pubkey(key)
        .map_err(|e| anyhow!("Failed to set request public key: {}", e))?;
    req_builder
        .sign(key, MessageDigest::sha256())
        .map_err(|e| anyhow!("Failed to sign request: {}", e))?;

    Ok(req_builder.build())
}
