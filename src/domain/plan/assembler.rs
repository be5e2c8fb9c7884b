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

use super::task::{LifecycleTag, ResourceState, Task, TaskPlan};
use crate::domain::config::{ApplicationModel, NamespaceIdentity};
use crate::shared::error::Result;

/// Deployment state requested from the deploy tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Start,
    Stop,
}

/// Cluster specific task producers.
///
/// The model handed to these methods is fully image-resolved.
pub trait DeployTasks {
    fn namespace_task(
        &self,
        namespace: &NamespaceIdentity,
        state: ResourceState,
        tags: &[LifecycleTag],
    ) -> Result<Task>;

    /// Setup objects (services) for every service, in declaration order
    fn service_tasks(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
        tags: &[LifecycleTag],
    ) -> Result<Vec<Task>>;

    fn deployment_tasks(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
        engine_state: EngineState,
        tags: &[LifecycleTag],
    ) -> Result<Vec<Task>>;

    fn pvc_tasks(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
        tags: &[LifecycleTag],
    ) -> Result<Vec<Task>>;
}

pub struct PlanAssembler<'a> {
    deploy: &'a dyn DeployTasks,
}

impl<'a> PlanAssembler<'a> {
    pub fn new(deploy: &'a dyn DeployTasks) -> Self {
        Self { deploy }
    }

    /// Build the lifecycle plan.
    ///
    /// The order is fixed: namespace create, namespace destroy, service
    /// setup, deployment stop, deployment start, volume claims. Every stop
    /// task precedes every start task so a restart tears down first.
    pub fn assemble(
        &self,
        model: &ApplicationModel,
        namespace: &NamespaceIdentity,
    ) -> Result<TaskPlan> {
        use LifecycleTag::*;

        let mut plan = TaskPlan::default();
        plan.push(
            self.deploy
                .namespace_task(namespace, ResourceState::Present, &[Start])?,
        );
        plan.push(
            self.deploy
                .namespace_task(namespace, ResourceState::Absent, &[Destroy])?,
        );
        plan.extend(self.deploy.service_tasks(model, namespace, &[Start])?);
        plan.extend(self.deploy.deployment_tasks(
            model,
            namespace,
            EngineState::Stop,
            &[Stop, Restart],
        )?);
        plan.extend(self.deploy.deployment_tasks(
            model,
            namespace,
            EngineState::Start,
            &[Start, Restart],
        )?);
        plan.extend(self.deploy.pvc_tasks(model, namespace, &[Start])?);

        tracing::debug!(tasks = plan.len(), namespace = namespace.name(), "assembled plan");
        Ok(plan)
    }
}
