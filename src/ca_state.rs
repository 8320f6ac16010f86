//! On-disk CA state inspection.
//!
//! Decides whether the root CA must be generated or can be reused. Reuse
//! requires both files to parse, the certificate's public key to match the
//! private key, and the certificate to be unexpired; a half-present pair is
//! an error rather than an overwrite.

use anyhow::{anyhow, bail, Result};
use openssl::asn1::Asn1Time;
use openssl::pkey::PKey;
use openssl::x509::X509;
use std::fs;
use std::path::Path;

/// Outcome of inspecting the CA files on disk.
#[derive(Debug, PartialEq, Eq)]
pub enum CaState {
    /// Neither file exists; a new CA must be generated.
    Absent,
    /// Both files exist and hold a consistent, unexpired pair.
    Usable,
}

/// Inspect the CA key and certificate paths and decide how issuance proceeds.
pub fn evaluate(key_path: &Path, cert_path: &Path) -> Result<CaState> {
    match (key_path.exists(), cert_path.exists()) {
        (false, false) => Ok(CaState::Absent),
        (true, false) => bail!(
            "found CA private key {} without its certificate {}; refusing to overwrite",
            key_path.display(),
            cert_path.display()
        ),
        (false, true) => bail!(
            "found CA certificate {} without its private key {}; refusing to overwrite",
            cert_path.display(),
            key_path.display()
        ),
        (true, true) => {
            validate_pair(key_path, cert_path)?;
            Ok(CaState::Usable)
        }
    }
}

fn validate_pair(key_path: &Path, cert_path: &Path) -> Result<()> {
    let key_pem = fs::read(key_path)
        .map_err(|e| anyhow!("Failed to read CA private key {}: {}", key_path.display(), e))?;
    let key = PKey::private_key_from_pem(&key_pem)
        .map_err(|e| anyhow!("Failed to parse CA private key {}: {}", key_path.display(), e))?;

    let cert_pem = fs::read(cert_path).map_err(|e| {
        anyhow!(
            "Failed to read CA certificate {}: {}",
            cert_path.display(),
            e
        )
    })?;
    let cert = X509::from_pem(&cert_pem).map_err(|e| {
        anyhow!(
            "Failed to parse CA certificate {}: {}",
            cert_path.display(),
            e
        )
    })?;

    let cert_key = cert
        .public_key()
        .map_err(|e| anyhow!("Failed to extract CA public key: {}", e))?;
    if !cert_key.public_eq(&key) {
        bail!(
            "CA certificate {} does not match private key {}",
            cert_path.display(),
            key_path.display()
        );
    }

    let now = Asn1Time::days_from_now(0)?;
    if cert.not_after() < now {
        bail!("CA certificate {} has expired", cert_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_root_ca::RsaRootCaBuilder;
    use crate::storage::CertStore;
    use openssl::pkey::Private;
    use tempfile::TempDir;

    fn test_pair() -> (PKey<Private>, X509) {
        RsaRootCaBuilder::new()
            .country("US".to_string())
            .state("California".to_string())
            .locality("San Francisco".to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_absent_when_neither_file_exists() {
        let dir = TempDir::new().unwrap();
        let state = evaluate(&dir.path().join("ca.key"), &dir.path().join("ca.crt")).unwrap();
        assert_eq!(state, CaState::Absent);
    }

    #[test]
    fn test_usable_for_consistent_pair() {
        let dir = TempDir::new().unwrap();
        let store = CertStore::new(dir.path());
        let (key, cert) = test_pair();
        store
            .write_key_certificate("ca.key", "ca.crt", &key, &cert)
            .unwrap();

        let state = evaluate(&store.path_of("ca.key"), &store.path_of("ca.crt")).unwrap();
        assert_eq!(state, CaState::Usable);
    }

    #[test]
    fn test_orphaned_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("ca.key");
        let (key, _cert) = test_pair();
        fs::write(&key_path, key.private_key_to_pem_pkcs8().unwrap()).unwrap();

        let result = evaluate(&key_path, &dir.path().join("ca.crt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_orphaned_certificate_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cert_path = dir.path().join("ca.crt");
        let (_key, cert) = test_pair();
        fs::write(&cert_path, cert.to_pem().unwrap()).unwrap();

        let result = evaluate(&dir.path().join("ca.key"), &cert_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_pair_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = CertStore::new(dir.path());
        let (_key_a, cert_a) = test_pair();
        let (key_b, _cert_b) = test_pair();
        // Certificate from one pair, private key from another.
        store
            .write_key_certificate("ca.key", "ca.crt", &key_b, &cert_a)
            .unwrap();

        let result = evaluate(&store.path_of("ca.key"), &store.path_of("ca.crt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_certificate_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (key, _cert) = test_pair();
        fs::write(
            dir.path().join("ca.key"),
            key.private_key_to_pem_pkcs8().unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("ca.crt"), b"not a certificate").unwrap();

        let result = evaluate(&dir.path().join("ca.key"), &dir.path().join("ca.crt"));
        assert!(result.is_err());
    }
}
