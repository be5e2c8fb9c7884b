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

//! Engine facade for a cluster technology.
//!
//! The facade owns the namespace identity and the application model and
//! wires the image resolver, the plan assembler and the credential mount
//! resolver together. It is generic over a [`ClusterBackend`], which supplies
//! the cluster specific deploy tasks and cluster client.
//!
//! Entry points are bound to an [`ExecutionContext`]. The calling harness
//! checks [`EntryPoint::required_context`] before invoking one; the engine
//! itself performs no check.

use crate::domain::config::{
    ApplicationModel, ClusterAuthConfig, NamespaceIdentity, NamespaceSettings,
};
use crate::domain::image::{ImageCatalog, ImageResolver, PushTarget};
use crate::domain::mounts::{CredentialMountResolver, MountManifest, PathProbe};
use crate::domain::plan::{DeployTasks, PlanAssembler, TaskPlan};
use crate::shared::error::Result;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Lifecycle operations a cluster technology supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub build_conductor: bool,
    pub build: bool,
    pub deploy: bool,
    pub import: bool,
    pub install: bool,
    pub login: bool,
    pub push: bool,
    pub run: bool,
    pub version: bool,
}

impl Capabilities {
    /// Image building is delegated to another engine.
    pub const KUBERNETES: Capabilities = Capabilities {
        build_conductor: false,
        build: false,
        deploy: true,
        import: false,
        install: false,
        login: true,
        push: true,
        run: true,
        version: false,
    };

    pub fn entries(&self) -> [(&'static str, bool); 9] {
        [
            ("build_conductor", self.build_conductor),
            ("build", self.build),
            ("deploy", self.deploy),
            ("import", self.import),
            ("install", self.install),
            ("login", self.login),
            ("push", self.push),
            ("run", self.run),
            ("version", self.version),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Has the local filesystem; prepares the privileged run
    Host,
    /// Sees the full application model; authors the plan
    Conductor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    GeneratePlan,
    CredentialMounts,
}

impl EntryPoint {
    pub fn required_context(&self) -> ExecutionContext {
        match self {
            EntryPoint::GeneratePlan => ExecutionContext::Conductor,
            EntryPoint::CredentialMounts => ExecutionContext::Host,
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Host => write!(f, "host"),
            ExecutionContext::Conductor => write!(f, "conductor"),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::GeneratePlan => write!(f, "generate_plan"),
            EntryPoint::CredentialMounts => write!(f, "credential_mounts"),
        }
    }
}

/// Applies authorization settings to the cluster client.
pub trait ClusterClient {
    fn set_authorization(&mut self, auth: &ClusterAuthConfig) -> Result<()>;
}

/// What a concrete cluster technology must provide.
pub trait ClusterBackend {
    fn display_name(&self) -> &str;

    fn capabilities(&self) -> Capabilities {
        Capabilities::KUBERNETES
    }

    fn deploy(&self) -> &dyn DeployTasks;

    fn cluster_client(&mut self) -> &mut dyn ClusterClient;
}

pub struct Engine<B: ClusterBackend> {
    project_name: String,
    namespace: NamespaceIdentity,
    model: ApplicationModel,
    backend: B,
    images: Box<dyn ImageCatalog>,
    probe: Box<dyn PathProbe>,
    default_kube_config: PathBuf,
}

impl<B: ClusterBackend> Engine<B> {
    pub fn new(
        project_name: impl Into<String>,
        namespace: &NamespaceSettings,
        model: ApplicationModel,
        backend: B,
        images: Box<dyn ImageCatalog>,
        probe: Box<dyn PathProbe>,
        default_kube_config: impl Into<PathBuf>,
    ) -> Result<Self> {
        let project_name = project_name.into();
        let namespace = NamespaceIdentity::from_settings(&project_name, namespace)?;

        tracing::debug!(
            namespace = namespace.name(),
            display_name = ?namespace.display_name(),
            description = ?namespace.description(),
            "k8s namespace"
        );

        Ok(Self {
            project_name,
            namespace,
            model,
            backend,
            images,
            probe,
            default_kube_config: default_kube_config.into(),
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn namespace(&self) -> &NamespaceIdentity {
        &self.namespace
    }

    pub fn model(&self) -> &ApplicationModel {
        &self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn display_name(&self) -> &str {
        self.backend.display_name()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    /// Resolve images, apply authorization and assemble the lifecycle plan.
    ///
    /// Conductor context only. Resolved images are written back into the
    /// model once every service resolved; on error the model is unchanged.
    pub fn generate_plan(
        &mut self,
        push_target: Option<&PushTarget>,
        auth: Option<&ClusterAuthConfig>,
    ) -> Result<TaskPlan> {
        let resolved = ImageResolver::new(self.images.as_ref()).resolve(&self.model, push_target)?;
        self.model.apply_images(resolved.iter());

        if let Some(auth) = auth.filter(|a| !a.is_empty()) {
            self.backend.cluster_client().set_authorization(auth)?;
        }

        let plan = PlanAssembler::new(self.backend.deploy()).assemble(&self.model, &self.namespace)?;
        tracing::info!(
            project = %self.project_name,
            tasks = plan.len(),
            "created plan to run project"
        );
        Ok(plan)
    }

    /// Host paths to mount read-only into the privileged context.
    ///
    /// Host context only.
    pub fn credential_mounts(&self, auth: Option<&ClusterAuthConfig>) -> Result<MountManifest> {
        CredentialMountResolver::new(&self.default_kube_config, self.probe.as_ref()).resolve(auth)
    }
}
