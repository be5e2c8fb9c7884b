// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::config::ClusterAuthConfig;
use crate::domain::engine::ClusterClient;
use crate::shared::error::{ConductorError, Result};
use kube::config::Kubeconfig;
use std::path::PathBuf;

/// How the plan runner authenticates against the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSource {
    /// Kubeconfig file, optionally pinned to a context
    KubeConfig {
        path: PathBuf,
        context: Option<String>,
    },
    Token,
    Basic,
    ClientCertificate,
    /// Nothing explicit; the runner's default resolution applies
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationProfile {
    pub source: AuthSource,
    pub host: Option<String>,
    pub verify_ssl: bool,
}

/// Cluster client holding the authorization the plan will run with.
#[derive(Debug, Default)]
pub struct KubeClusterClient {
    profile: Option<AuthorizationProfile>,
}

impl KubeClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&AuthorizationProfile> {
        self.profile.as_ref()
    }

    fn build_profile(auth: &ClusterAuthConfig) -> Result<AuthorizationProfile> {
        let source = if let Some(path) = auth.config_file.as_deref() {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                ConductorError::Authorization(format!("Failed to load kubeconfig {}: {}", path, e))
            })?;

            if let Some(context) = auth.context.as_deref() {
                if !kubeconfig.contexts.iter().any(|c| c.name == context) {
                    let available: Vec<_> =
                        kubeconfig.contexts.iter().map(|c| c.name.as_str()).collect();
                    return Err(ConductorError::Authorization(format!(
                        "Context '{}' not found in {} (available: {})",
                        context,
                        path,
                        if available.is_empty() {
                            "none".to_string()
                        } else {
                            available.join(", ")
                        }
                    )));
                }
            } else if kubeconfig.current_context.is_none() && kubeconfig.contexts.len() > 1 {
                tracing::warn!(
                    path,
                    "kubeconfig has several contexts and no current-context"
                );
            }

            AuthSource::KubeConfig {
                path: PathBuf::from(path),
                context: auth.context.clone(),
            }
        } else if auth.api_key.is_some() {
            AuthSource::Token
        } else if auth.username.is_some() || auth.password.is_some() {
            if auth.username.is_none() || auth.password.is_none() {
                return Err(ConductorError::Authorization(
                    "username and password must be set together".to_string(),
                ));
            }
            AuthSource::Basic
        } else if auth.cert_file.is_some() || auth.key_file.is_some() {
            if auth.cert_file.is_none() || auth.key_file.is_none() {
                return Err(ConductorError::Authorization(
                    "cert_file and key_file must be set together".to_string(),
                ));
            }
            AuthSource::ClientCertificate
        } else {
            AuthSource::Default
        };

        let needs_host = matches!(
            source,
            AuthSource::Token | AuthSource::Basic | AuthSource::ClientCertificate
        );
        if needs_host && auth.host.as_deref().map_or(true, str::is_empty) {
            return Err(ConductorError::Authorization(
                "host is required when no config_file is given".to_string(),
            ));
        }

        Ok(AuthorizationProfile {
            source,
            host: auth.host.clone(),
            verify_ssl: auth.verify_ssl.unwrap_or(true),
        })
    }
}

impl ClusterClient for KubeClusterClient {
    fn set_authorization(&mut self, auth: &ClusterAuthConfig) -> Result<()> {
        let profile = Self::build_profile(auth)?;
        tracing::debug!(source = ?profile.source, host = ?profile.host, "k8s authorization set");
        self.profile = Some(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
- name: dev-cluster
  cluster:
    server: https://127.0.0.1:6443
contexts:
- name: dev
  context:
    cluster: dev-cluster
    user: dev-user
users:
- name: dev-user
  user:
    token: abc
"#;

    fn kubeconfig_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KUBECONFIG.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_kubeconfig_with_known_context() {
        let file = kubeconfig_file();
        let auth = ClusterAuthConfig {
            config_file: Some(file.path().to_string_lossy().into_owned()),
            context: Some("dev".to_string()),
            ..Default::default()
        };
        let mut client = KubeClusterClient::new();
        client.set_authorization(&auth).unwrap();
        assert!(matches!(
            client.profile().unwrap().source,
            AuthSource::KubeConfig { ref context, .. } if context.as_deref() == Some("dev")
        ));
    }

    #[test]
    fn test_kubeconfig_unknown_context() {
        let file = kubeconfig_file();
        let auth = ClusterAuthConfig {
            config_file: Some(file.path().to_string_lossy().into_owned()),
            context: Some("prod".to_string()),
            ..Default::default()
        };
        let err = KubeClusterClient::new().set_authorization(&auth).unwrap_err();
        assert!(matches!(err, ConductorError::Authorization(ref msg) if msg.contains("dev")));
    }

    #[test]
    fn test_missing_kubeconfig() {
        let auth = ClusterAuthConfig {
            config_file: Some("/nonexistent/kubeconfig".to_string()),
            ..Default::default()
        };
        assert!(KubeClusterClient::new().set_authorization(&auth).is_err());
    }

    #[test]
    fn test_token_requires_host() {
        let mut auth = ClusterAuthConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(KubeClusterClient::new().set_authorization(&auth).is_err());

        auth.host = Some("https://k8s.example:6443".to_string());
        auth.verify_ssl = Some(false);
        let mut client = KubeClusterClient::new();
        client.set_authorization(&auth).unwrap();
        let profile = client.profile().unwrap();
        assert_eq!(profile.source, AuthSource::Token);
        assert!(!profile.verify_ssl);
    }

    #[test]
    fn test_partial_client_certificate() {
        let auth = ClusterAuthConfig {
            host: Some("https://k8s.example:6443".to_string()),
            cert_file: Some("/etc/k8s/cert.pem".to_string()),
            ..Default::default()
        };
        assert!(KubeClusterClient::new().set_authorization(&auth).is_err());
    }
}
