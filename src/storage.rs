use anyhow::{anyhow, Context, Result};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// PEM persistence for issued keys and certificates.
///
/// Key/certificate pairs commit all-or-nothing: each file is written to a
/// temp file in the target directory and renamed into place, and a
/// certificate failure rolls back the already-landed key file. A crashed run
/// therefore never leaves a private key on disk without its certificate.
pub struct CertStore {
    dir: PathBuf,
}

impl CertStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Absolute location of a file inside the store
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Persist a private key and certificate as PEM under the given names
    pub fn write_key_certificate(
        &self,
        key_name: &str,
        cert_name: &str,
        private_key: &PKey<Private>,
        certificate: &X509,
    ) -> Result<()> {
        let key_pem = private_key
            .private_key_to_pem_pkcs8()
            .map_err(|e| anyhow!("Failed to serialize private key: {}", e))?;
        let cert_pem = certificate
            .to_pem()
            .map_err(|e| anyhow!("Failed to serialize certificate: {}", e))?;

        let key_path = self.dir.join(key_name);
        let cert_path = self.dir.join(cert_name);

        write_atomic(&self.dir, &key_path, &key_pem)?;
        // Roll back the key file if the certificate does not land
        write_atomic(&self.dir, &cert_path, &cert_pem).or_else(|e| {
            let _ = fs::remove_file(&key_path);
            Err(e)
        })?;

        Ok(())
    }

    /// Persist a rendered text document (such as csr.conf) under the given name
    pub fn write_text(&self, file_name: &str, contents: &str) -> Result<()> {
        write_atomic(&self.dir, &self.dir.join(file_name), contents.as_bytes())
    }
}

/// Load the CA's private key and certificate from disk.
///
/// Called once per leaf issuance rather than cached; each generation step
/// works from the files as they currently exist.
pub fn load_ca_credentials(key_path: &Path, cert_path: &Path) -> Result<(PKey<Private>, X509)> {
    let key_pem = fs::read(key_path)
        .with_context(|| format!("Failed to read CA private key: {}", key_path.display()))?;
    let ca_key = PKey::private_key_from_pem(&key_pem)
        .map_err(|e| anyhow!("Failed to parse CA private key: {}", e))?;

    let cert_pem = fs::read(cert_path)
        .with_context(|| format!("Failed to read CA certificate: {}", cert_path.display()))?;
    let ca_cert = X509::from_pem(&cert_pem)
        .map_err(|e| anyhow!("Failed to parse CA certificate: {}", e))?;

    Ok((ca_key, ca_cert))
}

fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| anyhow!("Failed to persist {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_root_ca::RsaRootCaBuilder;
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
    fn test_write_key_certificate_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CertStore::new(dir.path());
        let (key, cert) = test_pair();

        store
            .write_key_certificate("ca.key", "ca.crt", &key, &cert)
            .unwrap();

        let (loaded_key, loaded_cert) =
            load_ca_credentials(&store.path_of("ca.key"), &store.path_of("ca.crt")).unwrap();
        assert!(loaded_cert.public_key().unwrap().public_eq(&loaded_key));
        assert_eq!(loaded_cert.to_pem().unwrap(), cert.to_pem().unwrap());
    }

    #[test]
    fn test_failed_certificate_write_rolls_back_key() {
        let dir = TempDir::new().unwrap();
        let store = CertStore::new(dir.path());
        let (key, cert) = test_pair();

        // A certificate name pointing into a missing subdirectory cannot be
        // renamed into place.
        let result = store.write_key_certificate("ca.key", "missing/ca.crt", &key, &cert);

        assert!(result.is_err());
        assert!(!store.path_of("ca.key").exists());
    }

    #[test]
    fn test_write_text() {
        let dir = TempDir::new().unwrap();
        let store = CertStore::new(dir.path());

        store.write_text("csr.conf", "[req]\nprompt = no\n").unwrap();

        let contents = fs::read_to_string(store.path_of("csr.conf")).unwrap();
        assert_eq!(contents, "[req]\nprompt = no\n");
    }

    #[test]
    fn test_load_ca_credentials_missing_files() {
        let dir = TempDir::new().unwrap();
        let result = load_ca_credentials(
            &dir.path().join("absent.key"),
            &dir.path().join("absent.crt"),
        );
        assert!(result.is_err());
    }
}
