//! Client certificate generation, one certificate per configured identity.
//!
//! Same shape as server certificate generation minus the CSR-configuration
//! rendering: fresh RSA key, transient self-signed request, CA-signed
//! certificate with common name = client identity and serial number 3.

use anyhow::{anyhow, Result};
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::x509::{X509Req, X509};

const RSA_KEY_SIZE: u32 = 2048;
const CLIENT_CERT_SERIAL: u32 = 3;
const VALIDITY_DAYS: u32 = 7500;

// ================= Client Certificate Builder =================

/// Builder for generating an RSA key pair and a client certificate signed by
/// the root CA
///
/// Every client certificate carries serial number 3; artifacts are
/// distinguished by file name, not by serial.
pub struct ClientCertBuilder {
    client_name: String,
    signing_key: PKey<Private>,
    signing_cert: X509,
}

impl ClientCertBuilder {
    /// Create a new client certificate builder
    ///
    /// # Arguments
    /// * `ca_key` - Root CA's private key for signing
    /// * `ca_cert` - Root CA's certificate (issuer information)
    pub fn new(ca_key: PKey<Private>, ca_cert: X509) -> Self {
        Self {
            client_name: String::new(),
            signing_key: ca_key,
            signing_cert: ca_cert,
        }
    }

    /// Set the client identity used as the certificate's common name (CN)
    pub fn client_name(mut self, client_name: String) -> Self {
        self.client_name = client_name;
        self
    }

    /// Build the RSA key pair and CA-signed client certificate
    pub fn build(self) -> Result<(PKey<Private>, X509)> {
        // Generate RSA key pair for the client
        let rsa = openssl::rsa::Rsa::generate(RSA_KEY_SIZE)
            .map_err(|e| anyhow!("Failed to generate RSA keypair: {}", e))?;

        let private_key =
            PKey::from_rsa(rsa).map_err(|e| anyhow!("Failed to create private key: {}", e))?;

        let request = build_signing_request(&self.client_name, &private_key)?;

        let mut builder =
            X509::builder().map_err(|e| anyhow!("Failed to create X509 builder: {}", e))?;

        let serial = BigNum::from_u32(CLIENT_CERT_SERIAL)?.to_asn1_integer()?;
        builder
            .set_serial_number(&serial)
            .map_err(|e| anyhow!("Failed to set serial number: {}", e))?;

        let mut name_builder = openssl::x509::X509Name::builder()
            .map_err(|e| anyhow!("Failed to create name builder: {}", e))?;
        name_builder
            .append_entry_by_nid(openssl::nid::Nid::COMMONNAME, &self.client_name)
            .map_err(|e| anyhow!("Failed to set CN: {}", e))?;
        let subject_name = name_builder.build();

        builder
            .set_subject_name(&subject_name)
            .map_err(|e| anyhow!("Failed to set subject: {}", e))?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_root_ca::RsaRootCaBuilder;
    use openssl::nid::Nid;
    use openssl::x509::X509VerifyResult;

    fn test_ca() -> (PKey<Private>, X509) {
        RsaRootCaBuilder::new()
            .country("US".to_string())
            .state("California".to_string())
            .locality("San Francisco".to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_cert_signed_by_ca() {
        let (ca_key, ca_cert) = test_ca();
        let (_key, cert) = ClientCertBuilder::new(ca_key, ca_cert.clone())
            .client_name("alice".to_string())
            .build()
            .unwrap();

        assert_eq!(ca_cert.issued(&cert), X509VerifyResult::OK);
        assert!(cert.verify(&ca_cert.public_key().unwrap()).unwrap());
    }

    #[test]
    fn test_client_cert_common_name() {
        let (ca_key, ca_cert) = test_ca();
        let (_key, cert) = ClientCertBuilder::new(ca_key, ca_cert)
            .client_name("alice".to_string())
            .build()
            .unwrap();

        let cn = cert
            .subject_name()
            .entries_by_nid(Nid::COMMONNAME)
            .next()
            .unwrap();
        assert_eq!(cn.data().as_utf8().unwrap().to_string(), "alice");
    }

    #[test]
    fn test_every_client_cert_has_serial_three() {
        let (ca_key, ca_cert) = test_ca();
        let (_key, alice) = ClientCertBuilder::new(ca_key.clone(), ca_cert.clone())
            .client_name("alice".to_string())
            .build()
            .unwrap();
        let (_key, bob) = ClientCertBuilder::new(ca_key, ca_cert)
            .client_name("bob".to_string())
            .build()
            .unwrap();

        let expected = BigNum::from_u32(3).unwrap();
        assert_eq!(alice.serial_number().to_bn().unwrap(), expected);
        assert_eq!(bob.serial_number().to_bn().unwrap(), expected);
    }

    #[test]
    fn test_validity_window_is_7500_days() {
        let (ca_key, ca_cert) = test_ca();
        let (_key, cert) = ClientCertBuilder::new(ca_key, ca_cert)
            .client_name("alice".to_string())
            .build()
            .unwrap();

        let diff = cert.not_before().diff(cert.not_after()).unwrap();
        assert_eq!(diff.days, 7500);
        assert_eq!(diff.secs, 0);
    }
}
