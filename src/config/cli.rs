//! Command-line flags.
//!
//! Flags keep their Go-style camel-case names and accept both `-name` and
//! `--name`, so existing kubelet manifests keep working.

use std::ffi::OsString;

use clap::{CommandFactory, Parser};

use crate::config::{ConfigError, ProxyConfig, TargetOrigin};
use crate::credentials::CredentialSource;

pub const DEFAULT_TARGET: &str = "https://localhost:10250";
pub const DEFAULT_PORT: &str = ":8039";
pub const DEFAULT_KUBECONFIG: &str = "/etc/kubernetes/kubeconfig/kubelet.kubeconfig";

#[derive(Debug, Clone, Parser)]
#[command(name = "kubelet-tls-proxy")]
#[command(about = "HTTP to HTTPS reverse proxy with mutual TLS client credentials", long_about = None)]
pub struct Cli {
    /// The https address
    #[arg(long, default_value = DEFAULT_TARGET)]
    pub target: String,

    /// The http port
    #[arg(long, default_value = DEFAULT_PORT)]
    pub port: String,

    /// The kubeconfig file; pass an empty value to disable it
    #[arg(long, default_value = DEFAULT_KUBECONFIG)]
    pub kubeconfig: String,

    /// The cert file
    #[arg(long = "certFile", default_value = "")]
    pub cert_file: String,

    /// The key file
    #[arg(long = "keyFile", default_value = "")]
    pub key_file: String,

    /// The ca file
    #[arg(long = "cAFile", default_value = "")]
    pub ca_file: String,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags.
    pub fn parse_args() -> Self {
        Self::parse_from(go_style_args(std::env::args_os()))
    }

    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource::select(&self.kubeconfig, &self.cert_file, &self.key_file, &self.ca_file)
    }

    /// Validate the flags into an immutable [`ProxyConfig`].
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let target = TargetOrigin::parse(&self.target)?;
        let credentials = self.credential_source();
        Ok(ProxyConfig {
            target,
            listen_address: self.port,
            credentials,
        })
    }
}

/// Rewrite `-name` and `-name=value` to their `--` form for every known long flag.
///
/// Values and anything after a bare `--` pass through untouched.
pub fn go_style_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let command = Cli::command();
    let known: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .collect();

    let mut rewritten = Vec::new();
    let mut passthrough = false;
    for arg in args {
        if passthrough || arg == "--" {
            passthrough = true;
            rewritten.push(arg);
            continue;
        }

        let single_dash = arg
            .to_str()
            .and_then(|s| s.strip_prefix('-'))
            .filter(|rest| !rest.starts_with('-'))
            .filter(|rest| known.contains(&rest.split('=').next().unwrap_or_default()));

        match single_dash {
            Some(rest) => rewritten.push(OsString::from(format!("--{rest}"))),
            None => rewritten.push(arg),
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn defaults_match_kubelet_layout() {
        let cli = Cli::try_parse_from(["kubelet-tls-proxy"]).unwrap();
        assert_eq!(cli.target, DEFAULT_TARGET);
        assert_eq!(cli.port, DEFAULT_PORT);
        assert_eq!(
            cli.credential_source(),
            CredentialSource::ClusterConfig(PathBuf::from(DEFAULT_KUBECONFIG))
        );
    }

    #[test]
    fn explicit_files_need_kubeconfig_disabled() {
        let cli = Cli::try_parse_from([
            "kubelet-tls-proxy",
            "--kubeconfig",
            "",
            "--certFile",
            "client.crt",
            "--keyFile",
            "client.key",
            "--cAFile",
            "ca.crt",
        ])
        .unwrap();

        assert_eq!(
            cli.credential_source(),
            CredentialSource::ExplicitFiles {
                cert: "client.crt".into(),
                key: "client.key".into(),
                ca: "ca.crt".into(),
            }
        );
    }

    #[test]
    fn kubeconfig_wins_over_explicit_files() {
        let cli = Cli::try_parse_from([
            "kubelet-tls-proxy",
            "--kubeconfig",
            "/tmp/admin.conf",
            "--certFile",
            "client.crt",
            "--keyFile",
            "client.key",
            "--cAFile",
            "ca.crt",
        ])
        .unwrap();

        assert_eq!(
            cli.credential_source(),
            CredentialSource::ClusterConfig("/tmp/admin.conf".into())
        );
    }

    fn go_args(args: &[&str]) -> Vec<OsString> {
        go_style_args(args.iter().map(OsString::from))
    }

    #[test]
    fn accepts_single_dash_flags() {
        let cli = Cli::try_parse_from(go_args(&[
            "kubelet-tls-proxy",
            "-target",
            "https://10.0.0.5:10250",
            "-port=:9000",
            "-kubeconfig",
            "",
            "-certFile",
            "client.crt",
            "--keyFile",
            "client.key",
            "-cAFile=ca.crt",
        ]))
        .unwrap();

        assert_eq!(cli.target, "https://10.0.0.5:10250");
        assert_eq!(cli.port, ":9000");
        assert_eq!(
            cli.credential_source(),
            CredentialSource::ExplicitFiles {
                cert: "client.crt".into(),
                key: "client.key".into(),
                ca: "ca.crt".into(),
            }
        );
    }

    #[test]
    fn single_dash_rewrite_leaves_values_alone() {
        let args = go_args(&["kubelet-tls-proxy", "-port", "-x", "-h", "--", "-target"]);
        assert_eq!(args, go_args(&["kubelet-tls-proxy", "--port", "-x", "-h", "--", "-target"]));
    }

    #[test]
    fn into_config_rejects_bad_target() {
        let cli = Cli::try_parse_from(["kubelet-tls-proxy", "--target", "::nope"]).unwrap();
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn into_config_keeps_raw_port() {
        let cli = Cli::try_parse_from(["kubelet-tls-proxy", "--port", "127.0.0.1:9000"]).unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.listen_address, "127.0.0.1:9000");
        assert_eq!(config.target.authority().as_str(), "localhost:10250");
    }
}
