//! Cluster client configuration (kubeconfig) reader.
//!
//! Only the pieces needed for mutual TLS are modelled: the current context,
//! its cluster's CA and its user's client certificate and key. Each of those
//! may be embedded inline (`*-data`, base64) or referenced by file path;
//! relative paths resolve against the kubeconfig's own directory.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::credentials::CredentialError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Kubeconfig {
    pub current_context: Option<String>,
    pub clusters: Vec<NamedCluster>,
    pub contexts: Vec<NamedContext>,
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    #[serde(default)]
    pub cluster: Cluster,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Cluster {
    pub server: Option<String>,
    pub certificate_authority: Option<String>,
    pub certificate_authority_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NamedContext {
    pub name: String,
    #[serde(default)]
    pub context: Context,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Context {
    pub cluster: String,
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: AuthInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AuthInfo {
    pub client_certificate: Option<String>,
    pub client_certificate_data: Option<String>,
    pub client_key: Option<String>,
    pub client_key_data: Option<String>,
}

/// Raw PEM material pulled out of the current context.
#[derive(Debug)]
pub struct ClientCredentials {
    /// CA bundle, if the cluster names one.
    pub ca: Option<Vec<u8>>,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

/// Read and resolve a kubeconfig file.
pub fn load(path: &Path) -> Result<ClientCredentials, CredentialError> {
    let raw = fs::read_to_string(path).map_err(|source| CredentialError::ReadFile {
        what: "kubeconfig",
        path: path.to_path_buf(),
        source,
    })?;
    let config: Kubeconfig =
        serde_yaml::from_str(&raw).map_err(|source| CredentialError::ParseKubeconfig {
            path: path.to_path_buf(),
            source,
        })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.client_credentials(path, base_dir)
}

impl Kubeconfig {
    /// Cluster and user selected by `current-context`.
    pub fn current(&self, path: &Path) -> Result<(&Cluster, &str, &AuthInfo), CredentialError> {
        let name = self
            .current_context
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CredentialError::NoCurrentContext {
                path: path.to_path_buf(),
            })?;

        let context = self
            .contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.context)
            .ok_or_else(|| CredentialError::MissingContext(name.to_string()))?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| CredentialError::MissingCluster(context.cluster.clone()))?;

        let user = self
            .users
            .iter()
            .find(|u| u.name == context.user)
            .map(|u| &u.user)
            .ok_or_else(|| CredentialError::MissingUser(context.user.clone()))?;

        Ok((cluster, context.user.as_str(), user))
    }

    pub fn client_credentials(
        &self,
        path: &Path,
        base_dir: &Path,
    ) -> Result<ClientCredentials, CredentialError> {
        let (cluster, user_name, user) = self.current(path)?;

        if let Some(server) = &cluster.server {
            tracing::debug!(server = %server, "kubeconfig cluster server is not used; relaying to the configured target");
        }

        let ca = inline_or_file(
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            "certificate-authority",
            base_dir,
        )?;

        let cert = inline_or_file(
            user.client_certificate_data.as_deref(),
            user.client_certificate.as_deref(),
            "client-certificate",
            base_dir,
        )?
        .ok_or_else(|| CredentialError::MissingClientData {
            user: user_name.to_string(),
            field: "client-certificate",
        })?;

        let key = inline_or_file(
            user.client_key_data.as_deref(),
            user.client_key.as_deref(),
            "client-key",
            base_dir,
        )?
        .ok_or_else(|| CredentialError::MissingClientData {
            user: user_name.to_string(),
            field: "client-key",
        })?;

        Ok(ClientCredentials { ca, cert, key })
    }
}

/// Inline base64 data wins over a file reference.
fn inline_or_file(
    data: Option<&str>,
    file: Option<&str>,
    field: &'static str,
    base_dir: &Path,
) -> Result<Option<Vec<u8>>, CredentialError> {
    if let Some(data) = data.filter(|d| !d.trim().is_empty()) {
        let compact: String = data.split_whitespace().collect();
        let decoded = STANDARD
            .decode(compact)
            .map_err(|source| CredentialError::Base64 { field, source })?;
        return Ok(Some(decoded));
    }

    match file.filter(|f| !f.is_empty()) {
        Some(file) => {
            let path = resolve(base_dir, file);
            fs::read(&path)
                .map(Some)
                .map_err(|source| CredentialError::ReadFile {
                    what: field,
                    path,
                    source,
                })
        }
        None => Ok(None),
    }
}

fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
