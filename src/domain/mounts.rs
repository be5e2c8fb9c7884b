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

//! Credential mounts for the privileged execution context.

use crate::domain::config::ClusterAuthConfig;
use crate::infrastructure::constants::{
    DEFAULT_KUBE_CONFIG_RELATIVE, KUBE_CONFIG_MOUNT_TARGET, MOUNT_MODE_READ_ONLY,
};
use crate::shared::error::{ConductorError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Filesystem existence check used for the default kube config.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem; only regular files count.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl PathProbe for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// `~/.kube/config` for the current user, `None` when `HOME` is unset
pub fn default_kube_config_path() -> Option<PathBuf> {
    kube_config_under(std::env::var_os("HOME"))
}

fn kube_config_under(home: Option<OsString>) -> Option<PathBuf> {
    home.filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(DEFAULT_KUBE_CONFIG_RELATIVE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MountMode {
    #[serde(rename = "ro")]
    ReadOnly,
}

impl MountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountMode::ReadOnly => MOUNT_MODE_READ_ONLY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mount {
    pub bind: String,
    pub mode: MountMode,
}

/// Host path -> mount inside the execution context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MountManifest {
    entries: BTreeMap<String, Mount>,
}

impl MountManifest {
    /// Add a read-only mount.
    ///
    /// Re-adding an identical mapping is a no-op. A host path bound to two
    /// targets, or two host paths bound to one target, is rejected.
    pub fn insert_read_only(&mut self, host: &str, target: &str) -> Result<()> {
        if let Some(existing) = self.entries.get(host) {
            if existing.bind == target {
                return Ok(());
            }
            return Err(ConductorError::mount_conflict(host, host, &existing.bind));
        }

        if let Some((other_host, _)) = self.entries.iter().find(|(_, m)| m.bind == target) {
            return Err(ConductorError::mount_conflict(other_host, host, target));
        }

        self.entries.insert(
            host.to_string(),
            Mount {
                bind: target.to_string(),
                mode: MountMode::ReadOnly,
            },
        );
        Ok(())
    }

    pub fn get(&self, host: &str) -> Option<&Mount> {
        self.entries.get(host)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Mount)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct CredentialMountResolver<'a> {
    default_config: PathBuf,
    probe: &'a dyn PathProbe,
}

impl<'a> CredentialMountResolver<'a> {
    pub fn new(default_config: impl Into<PathBuf>, probe: &'a dyn PathProbe) -> Self {
        Self {
            default_config: default_config.into(),
            probe,
        }
    }

    pub fn resolve(&self, auth: Option<&ClusterAuthConfig>) -> Result<MountManifest> {
        let auth = auth.filter(|a| !a.is_empty());
        let mut manifest = MountManifest::default();

        // Only an explicit config_file suppresses the default config.
        let explicit_config = auth.and_then(|a| a.config_file.as_deref());
        // An empty default path means there is no home directory to look in.
        let has_default = !self.default_config.as_os_str().is_empty()
            && self.probe.exists(&self.default_config);
        if explicit_config.is_none() && has_default {
            let host = self.default_config.to_string_lossy();
            tracing::debug!(host = %host, "mounting default kube config");
            manifest.insert_read_only(&host, KUBE_CONFIG_MOUNT_TARGET)?;
        }

        if let Some(auth) = auth {
            for (field, path) in auth.path_fields() {
                if let Some(path) = path {
                    tracing::debug!(field, path, "mounting k8s_auth path");
                    manifest.insert_read_only(path, path)?;
                }
            }
        }

        Ok(manifest)
    }
}
