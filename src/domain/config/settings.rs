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

use crate::domain::config::application::is_valid_k8s_name;
use crate::shared::error::{ConductorError, Result};
use serde::{Deserialize, Serialize};

/// Project level `settings` block
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub project_name: Option<String>,
    pub k8s_namespace: NamespaceSettings,
    pub k8s_auth: Option<ClusterAuthConfig>,
}

impl Settings {
    /// Auth settings, treating an empty block as absent
    pub fn cluster_auth(&self) -> Option<&ClusterAuthConfig> {
        self.k8s_auth.as_ref().filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamespaceSettings {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Cluster authorization settings.
///
/// The four path fields are host paths that must be visible, unmodified,
/// inside the privileged execution context. The rest is handed to the
/// cluster client as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterAuthConfig {
    pub config_file: Option<String>,
    pub ssl_ca_cert: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub context: Option<String>,
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: Option<bool>,
}

impl ClusterAuthConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Path-bearing fields in a fixed order: config file, CA cert,
    /// client cert, client key
    pub fn path_fields(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("config_file", self.config_file.as_deref()),
            ("ssl_ca_cert", self.ssl_ca_cert.as_deref()),
            ("cert_file", self.cert_file.as_deref()),
            ("key_file", self.key_file.as_deref()),
        ]
    }

    /// Set a field by its settings key. Returns false for unknown keys.
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        let value = value.to_string();
        match key {
            "config_file" => self.config_file = Some(value),
            "ssl_ca_cert" => self.ssl_ca_cert = Some(value),
            "cert_file" => self.cert_file = Some(value),
            "key_file" => self.key_file = Some(value),
            "context" => self.context = Some(value),
            "host" => self.host = Some(value),
            "api_key" => self.api_key = Some(value),
            "username" => self.username = Some(value),
            "password" => self.password = Some(value),
            "verify_ssl" => self.verify_ssl = Some(!matches!(value.as_str(), "false" | "no" | "0")),
            _ => return false,
        }
        true
    }
}

/// Identity of the namespace the application is deployed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceIdentity {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
}

impl NamespaceIdentity {
    /// Build from the settings block; the name falls back to the project name.
    pub fn from_settings(project_name: &str, settings: &NamespaceSettings) -> Result<Self> {
        let name = settings
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(project_name)
            .to_string();

        if !is_valid_k8s_name(&name) || name.len() > 63 {
            return Err(ConductorError::ConfigError(format!(
                "Invalid namespace name: {}",
                name
            )));
        }

        Ok(Self {
            name,
            display_name: settings.display_name.clone(),
            description: settings.description.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
