//! PEM decoding for CA bundles and client key pairs.

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::RootCertStore;

use crate::credentials::CredentialError;

/// Every certificate in a PEM blob, in order. Non-certificate sections are skipped.
pub fn certificates(
    pem: &[u8],
    what: &'static str,
) -> Result<Vec<CertificateDer<'static>>, CredentialError> {
    rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| CredentialError::Pem { what, source })
}

/// Client certificate chain; at least one certificate is required.
pub fn certificate_chain(
    pem: &[u8],
    what: &'static str,
) -> Result<Vec<CertificateDer<'static>>, CredentialError> {
    let chain = certificates(pem, what)?;
    if chain.is_empty() {
        return Err(CredentialError::NoCertificates(what));
    }
    Ok(chain)
}

/// First private key (PKCS#1, PKCS#8 or SEC1) in a PEM blob.
pub fn private_key(pem: &[u8], what: &'static str) -> Result<PrivateKeyDer<'static>, CredentialError> {
    rustls_pemfile::private_key(&mut &pem[..])
        .map_err(|source| CredentialError::Pem { what, source })?
        .ok_or(CredentialError::NoPrivateKey(what))
}

/// Trusted roots from a CA bundle.
///
/// An empty bundle is tolerated: the pool ends up empty and a warning is logged.
pub fn root_store(pem: &[u8], what: &'static str) -> Result<RootCertStore, CredentialError> {
    let certs = certificates(pem, what)?;
    if certs.is_empty() {
        tracing::warn!(source = what, "CA bundle contains no certificates");
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if ignored > 0 {
        tracing::warn!(source = what, added, ignored, "skipped unparsable CA certificates");
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_signed() -> (String, String) {
        let key = rcgen::KeyPair::generate().unwrap();
        let cert = rcgen::CertificateParams::new(vec!["localhost".to_string()])
            .unwrap()
            .self_signed(&key)
            .unwrap();
        (cert.pem(), key.serialize_pem())
    }

    #[test]
    fn reads_chain_and_key_from_one_bundle() {
        let (cert, key) = self_signed();
        let bundle = format!("{cert}{key}");

        let chain = certificate_chain(bundle.as_bytes(), "bundle").unwrap();
        assert_eq!(chain.len(), 1);
        assert!(private_key(bundle.as_bytes(), "bundle").is_ok());
    }

    #[test]
    fn missing_key_is_an_error() {
        let (cert, _) = self_signed();
        assert!(matches!(
            private_key(cert.as_bytes(), "key file"),
            Err(CredentialError::NoPrivateKey("key file"))
        ));
    }

    #[test]
    fn missing_certificate_is_an_error() {
        assert!(matches!(
            certificate_chain(b"just some text\n", "cert file"),
            Err(CredentialError::NoCertificates("cert file"))
        ));
    }

    #[test]
    fn malformed_pem_section_is_an_error() {
        let broken = b"-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            certificates(broken, "ca file"),
            Err(CredentialError::Pem { .. })
        ));
    }

    #[test]
    fn empty_ca_bundle_yields_empty_pool() {
        let roots = root_store(b"", "ca file").unwrap();
        assert!(roots.is_empty());

        let (cert, _) = self_signed();
        let roots = root_store(cert.as_bytes(), "ca file").unwrap();
        assert_eq!(roots.len(), 1);
    }
}
