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

//! Kubernetes backend

pub mod client;
pub mod deploy;
pub mod resources;

pub use self::client::{AuthSource, AuthorizationProfile, KubeClusterClient};
pub use self::deploy::KubernetesDeploy;

use crate::domain::engine::{ClusterBackend, ClusterClient};
use crate::domain::plan::DeployTasks;
use crate::infrastructure::constants::ENGINE_DISPLAY_NAME;

pub struct KubernetesBackend {
    deploy: KubernetesDeploy,
    client: KubeClusterClient,
}

impl KubernetesBackend {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            deploy: KubernetesDeploy::new(project_name),
            client: KubeClusterClient::new(),
        }
    }

    pub fn client(&self) -> &KubeClusterClient {
        &self.client
    }
}

impl ClusterBackend for KubernetesBackend {
    fn display_name(&self) -> &str {
        ENGINE_DISPLAY_NAME
    }

    fn deploy(&self) -> &dyn DeployTasks {
        &self.deploy
    }

    fn cluster_client(&mut self) -> &mut dyn ClusterClient {
        &mut self.client
    }
}
