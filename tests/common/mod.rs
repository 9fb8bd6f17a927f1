//! Shared utilities for integration testing: a throwaway PKI, TLS upstreams
//! and an in-process proxy.
#![allow(dead_code)]

use std::fs;
use std::future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rcgen::{
    BasicConstraints, CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use kubelet_proxy::config::{ProxyConfig, TargetOrigin};
use kubelet_proxy::credentials::CredentialSource;
use kubelet_proxy::lifecycle::startup;

/// A CA plus one server and one client certificate signed by it.
pub struct TestPki {
    pub ca_pem: String,
    pub client_cert_pem: String,
    pub client_key_pem: String,
    ca_der: CertificateDer<'static>,
    server_cert_der: CertificateDer<'static>,
    server_key_der: Vec<u8>,
}

impl TestPki {
    pub fn generate() -> Self {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::default();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        let ca_cert = ca_params.self_signed(&ca_key).unwrap();

        let server_key = KeyPair::generate().unwrap();
        let server_cert = CertificateParams::new(vec!["localhost".to_string()])
            .unwrap()
            .signed_by(&server_key, &ca_cert, &ca_key)
            .unwrap();

        let client_key = KeyPair::generate().unwrap();
        let mut client_params = CertificateParams::new(vec!["kubelet-client".to_string()]).unwrap();
        client_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
        let client_cert = client_params
            .signed_by(&client_key, &ca_cert, &ca_key)
            .unwrap();

        Self {
            ca_pem: ca_cert.pem(),
            client_cert_pem: client_cert.pem(),
            client_key_pem: client_key.serialize_pem(),
            ca_der: ca_cert.der().clone(),
            server_cert_der: server_cert.der().clone(),
            server_key_der: server_key.serialize_der(),
        }
    }

    /// Write client cert, client key and CA to `dir`; returns them in that order.
    pub fn write_files(&self, dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let cert = dir.join("client.crt");
        let key = dir.join("client.key");
        let ca = dir.join("ca.crt");
        fs::write(&cert, &self.client_cert_pem).unwrap();
        fs::write(&key, &self.client_key_pem).unwrap();
        fs::write(&ca, &self.ca_pem).unwrap();
        (cert, key, ca)
    }

    pub fn explicit_files(&self, dir: &Path) -> CredentialSource {
        let (cert, key, ca) = self.write_files(dir);
        CredentialSource::ExplicitFiles { cert, key, ca }
    }

    /// Write a kubeconfig with the credentials embedded inline.
    pub fn write_kubeconfig(&self, dir: &Path) -> PathBuf {
        let raw = format!(
            r#"apiVersion: v1
kind: Config
current-context: kubelet
clusters:
- name: local
  cluster:
    server: https://127.0.0.1:6443
    certificate-authority-data: {}
contexts:
- name: kubelet
  context:
    cluster: local
    user: node
users:
- name: node
  user:
    client-certificate-data: {}
    client-key-data: {}
"#,
            STANDARD.encode(&self.ca_pem),
            STANDARD.encode(&self.client_cert_pem),
            STANDARD.encode(&self.client_key_pem),
        );

        let path = dir.join("kubelet.kubeconfig");
        fs::write(&path, raw).unwrap();
        path
    }

    fn server_config(&self, require_client_cert: bool) -> ServerConfig {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ServerConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .unwrap();

        let builder = if require_client_cert {
            let mut roots = RootCertStore::empty();
            roots.add(self.ca_der.clone()).unwrap();
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .unwrap();
            builder.with_client_cert_verifier(verifier)
        } else {
            builder.with_no_client_auth()
        };

        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.server_key_der.clone()));
        builder
            .with_single_cert(vec![self.server_cert_der.clone()], key)
            .unwrap()
    }
}

/// Start an HTTPS upstream on an ephemeral port.
pub fn start_tls_upstream(pki: &TestPki, require_client_cert: bool, app: Router) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    serve_tls_upstream(pki, require_client_cert, app, listener)
}

/// Start an HTTPS upstream on an already bound listener.
pub fn serve_tls_upstream(
    pki: &TestPki,
    require_client_cert: bool,
    app: Router,
    listener: std::net::TcpListener,
) -> SocketAddr {
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let config = RustlsConfig::from_config(Arc::new(pki.server_config(require_client_cert)));

    tokio::spawn(async move {
        let _ = axum_server::from_tcp_rustls(listener, config)
            .serve(app.into_make_service())
            .await;
    });
    addr
}

/// An address nothing is listening on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn proxy_config(upstream: SocketAddr, credentials: CredentialSource) -> ProxyConfig {
    ProxyConfig {
        target: TargetOrigin::parse(&format!("https://{upstream}")).unwrap(),
        listen_address: "127.0.0.1:0".to_string(),
        credentials,
    }
}

/// Start the proxy in-process, relaying to `upstream`.
pub async fn start_proxy(upstream: SocketAddr, credentials: CredentialSource) -> SocketAddr {
    let (server, listener) = startup::prepare(&proxy_config(upstream, credentials))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_until(listener, future::pending()).await;
    });
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
