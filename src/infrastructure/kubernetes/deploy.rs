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

use crate::domain::config::{ApplicationModel, NamespaceIdentity};
use crate::domain::plan::{
    DeployTasks, EngineState, LifecycleTag, ResourceKind, ResourceState, Task,
};
use crate::infrastructure::kubernetes::resources::{
    DeploymentBuilder, NamespaceBuilder, PvcBuilder, ServiceBuilder,
};
use crate::shared::error::Result;

/// Turns an image-resolved application model into Kubernetes tasks.
pub struct KubernetesDeploy {
    project_name: String,
}

impl KubernetesDeploy {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
        }
    }
}

impl DeployTasks for KubernetesDeploy {
    fn namespace_task(
        &self,
        namespace: &NamespaceIdentity,
        state: ResourceState,
        tags: &[LifecycleTag],
    ) -> Result<Task> {
        let definition =
            serde_json::to_value(NamespaceBuilder::new(&self.project_name, namespace).build())?;
        let verb = match state {
            ResourceState::Present => "Create",
            ResourceState::Absent => "Destroy",
        };
        Ok(Task::new(
            format!("{} namespace {}", verb, namespace.name()),
            ResourceKind::Namespace,
            state,
            definition,
            tags,
        ))
    }

    fn service_tasks(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
        tags: &[LifecycleTag],
    ) -> Result<Vec<Task>> {
        model
            .services()
            .iter()
            .map(|service| -> Result<Task> {
                let svc = ServiceBuilder::new(&self.project_name, namespace.name(), service)
                    .build()?;
                Ok(Task::new(
                    format!("Create service {}", service.name),
                    ResourceKind::Service,
                    ResourceState::Present,
                    serde_json::to_value(svc)?,
                    tags,
                ))
            })
            .collect()
    }

    fn deployment_tasks(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
        engine_state: EngineState,
        tags: &[LifecycleTag],
    ) -> Result<Vec<Task>> {
        let (verb, stopped) = match engine_state {
            EngineState::Start => ("Start", false),
            EngineState::Stop => ("Stop", true),
        };

        model
            .services()
            .iter()
            .map(|service| -> Result<Task> {
                let deployment =
                    DeploymentBuilder::new(&self.project_name, namespace.name(), service)
                        .stopped(stopped)
                        .build()?;
                Ok(Task::new(
                    format!("{} deployment {}", verb, service.name),
                    ResourceKind::Deployment,
                    ResourceState::Present,
                    serde_json::to_value(deployment)?,
                    tags,
                ))
            })
            .collect()
    }

    fn pvc_tasks(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
        tags: &[LifecycleTag],
    ) -> Result<Vec<Task>> {
        model
            .volumes()
            .iter()
            .map(|volume| -> Result<Task> {
                let pvc = PvcBuilder::new(&self.project_name, namespace.name(), volume).build();
                Ok(Task::new(
                    format!("Create volume claim {}", volume.name),
                    ResourceKind::PersistentVolumeClaim,
                    ResourceState::Present,
                    serde_json::to_value(pvc)?,
                    tags,
                ))
            })
            .collect()
    }
}
