//! Upstream TLS client configuration.

use std::sync::Arc;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::credentials::{CredentialError, PeerVerification, TlsTransportConfig};

/// HTTP client that always speaks TLS to the upstream.
pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the upstream client. `None` gives the default transport, which
/// verifies the upstream against the platform's native roots and presents
/// no client certificate.
pub fn build_client(tls: Option<&TlsTransportConfig>) -> Result<HttpsClient, CredentialError> {
    let connector = HttpsConnectorBuilder::new()
        .with_tls_config(client_config(tls)?)
        .https_only()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(connector))
}

/// rustls client configuration for the given credentials.
///
/// Also validates that the client key can sign for the certificate chain, so
/// a broken key pair is caught at startup rather than on the first request.
pub fn client_config(tls: Option<&TlsTransportConfig>) -> Result<ClientConfig, CredentialError> {
    let provider = Arc::new(ring::default_provider());
    let builder =
        ClientConfig::builder_with_provider(provider.clone()).with_safe_default_protocol_versions()?;

    let Some(tls) = tls else {
        return Ok(builder
            .with_root_certificates(native_roots())
            .with_no_client_auth());
    };

    let builder = match tls.verification {
        PeerVerification::Verify => builder.with_root_certificates(tls.roots.clone()),
        PeerVerification::Disabled => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipServerVerification::new(provider))),
    };

    Ok(builder.with_client_auth_cert(tls.cert_chain.clone(), tls.key.clone_key())?)
}

fn native_roots() -> RootCertStore {
    let loaded = rustls_native_certs::load_native_certs();
    for error in &loaded.errors {
        tracing::warn!(error = %error, "failed to load native root certificates");
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
    tracing::debug!(added, ignored, "loaded native root certificates");
    roots
}

/// Accepts any upstream certificate chain.
///
/// Used only when client credentials are configured, to reach kubelets that
/// serve self-signed certificates. Handshake signatures are still verified,
/// so the peer must hold the key for the certificate it presents.
#[derive(Debug)]
pub struct SkipServerVerification(Arc<CryptoProvider>);

impl SkipServerVerification {
    pub fn new(provider: Arc<CryptoProvider>) -> Self {
        Self(provider)
    }
}

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
