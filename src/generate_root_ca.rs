//! Root CA Certificate Generation Module
//!
//! Generates the self-signed root key/certificate pair that anchors all
//! issued server and client certificates.
//!
//! # Certificate Properties
//! - **Self-signed**: Issuer and subject are the same
//! - **Subject**: country (C), state (ST), locality (L)
//! - **Key Size**: RSA 2048-bit
//! - **Serial Number**: 1
//! - **Validity**: 7500 days from generation time
//! - **Signature Algorithm**: SHA-256 with RSA

use anyhow::{anyhow, Result};
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;

const RSA_KEY_SIZE: u32 = 2048;
const ROOT_CA_SERIAL: u32 = 1;
const VALIDITY_DAYS: u32 = 7500;

// ================= RSA Root CA Builder =================

/// Builder for generating an RSA key pair and self-signed root CA certificate
///
/// The subject distinguished name carries only country, state and locality;
/// the same name is used as the issuer.
///
/// # Examples
/// ```no_run
/// use localca::generate_root_ca::RsaRootCaBuilder;
/// # fn example() -> anyhow::Result<()> {
/// let (ca_key, ca_cert) = RsaRootCaBuilder::new()
///     .country("IR".to_string())
///     .state("Tehran".to_string())
///     .locality("Tehran".to_string())
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct RsaRootCaBuilder {
    country: String,
    state: String,
    locality: String,
}

impl Default for RsaRootCaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RsaRootCaBuilder {
    /// Create a new root CA builder with empty subject fields
    pub fn new() -> Self {
        Self {
            country: String::new(),
            state: String::new(),
            locality: String::new(),
        }
    }

    /// Set the country (C) for the certificate (2-letter ISO code)
    pub fn country(mut self, country: String) -> Self {
        self.country = country;
        self
    }

    /// Set the state/province (ST) for the certificate
    pub fn state(mut self, state: String) -> Self {
        self.state = state;
        self
    }

    /// Set the locality (L) for the certificate
    pub fn locality(mut self, locality: String) -> Self {
        self.locality = locality;
        self
    }

    /// Build the RSA key pair and self-signed root CA certificate
    ///
    /// # Returns
    /// * `Ok((PKey<Private>, X509))` - Tuple of (private key, self-signed certificate)
    /// * `Err(anyhow::Error)` - If key generation or certificate construction fails
    pub fn build(self) -> Result<(PKey<Private>, X509)> {
        // Generate RSA key pair
        let rsa = openssl::rsa::Rsa::generate(RSA_KEY_SIZE)
            .map_err(|e| anyhow!("Failed to generate RSA keypair: {}", e))?;

        let private_key =
            PKey::from_rsa(rsa).map_err(|e| anyhow!("Failed to create private key: {}", e))?;

        // Build X509 certificate
        let mut builder =
            X509::builder().map_err(|e| anyhow!("Failed to create X509 builder: {}", e))?;

        let serial = BigNum::from_u32(ROOT_CA_SERIAL)?.to_asn1_integer()?;
        builder
            .set_serial_number(&serial)
            .map_err(|e| anyhow!("Failed to set serial number: {}", e))?;

        // Build subject/issuer name
        let mut name_builder = openssl::x509::X509Name::builder()
            .map_err(|e| anyhow!("Failed to create name builder: {}", e))?;

        name_builder
            .append_entry_by_nid(openssl::nid::Nid::COUNTRYNAME, &self.country)
            .map_err(|e| anyhow!("Failed to set country: {}", e))?;

        name_builder
            .append_entry_by_nid(openssl::nid::Nid::STATEORPROVINCENAME, &self.state)
            .map_err(|e| anyhow!("Failed to set state/province: {}", e))?;

        name_builder
            .append_entry_by_nid(openssl::nid::Nid::LOCALITYNAME, &self.locality)
            .map_err(|e| anyhow!("Failed to set locality: {}", e))?;

        let name = name_builder.build();

        builder
            .set_subject_name(&name)
            .map_err(|e| anyhow!("Failed to set subject: {}", e))?;

        // Self-signed, so the issuer is the subject itself
        builder
            .set_issuer_name(&name)
            .map_err(|e| anyhow!("Failed to set issuer: {}", e))?;

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

        builder
            .set_pubkey(&private_key)
            .map_err(|e| anyhow!("Failed to set public key: {}", e))?;

        builder
            .sign(&private_key, MessageDigest::sha256())
            .map_err(|e| anyhow!("Failed to sign certificate: {}", e))?;

        let x509 = builder.build();
        Ok((private_key, x509))
    }
}
