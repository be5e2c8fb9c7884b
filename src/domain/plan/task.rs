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

use crate::infrastructure::constants::{STATE_ABSENT, STATE_PRESENT};
use crate::shared::error::ConductorError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle phases a task applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleTag {
    Start,
    Stop,
    Restart,
    Destroy,
}

impl LifecycleTag {
    pub const ALL: [LifecycleTag; 4] = [
        LifecycleTag::Start,
        LifecycleTag::Stop,
        LifecycleTag::Restart,
        LifecycleTag::Destroy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleTag::Start => "start",
            LifecycleTag::Stop => "stop",
            LifecycleTag::Restart => "restart",
            LifecycleTag::Destroy => "destroy",
        }
    }
}

impl fmt::Display for LifecycleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleTag {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(LifecycleTag::Start),
            "stop" => Ok(LifecycleTag::Stop),
            "restart" => Ok(LifecycleTag::Restart),
            "destroy" => Ok(LifecycleTag::Destroy),
            _ => Err(ConductorError::ConfigError(format!(
                "Invalid lifecycle tag: {}",
                s
            ))),
        }
    }
}

/// Desired state of the task's resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Present,
    Absent,
}

impl ResourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Present => STATE_PRESENT,
            ResourceState::Absent => STATE_ABSENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Namespace,
    Service,
    Deployment,
    PersistentVolumeClaim,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Service => "Service",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceAction {
    pub state: ResourceState,
    pub definition: serde_json::Value,
}

/// One unit of the orchestration plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub name: String,
    #[serde(rename = "k8s")]
    pub action: ResourceAction,
    pub tags: BTreeSet<LifecycleTag>,
    #[serde(skip)]
    pub kind: ResourceKind,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        kind: ResourceKind,
        state: ResourceState,
        definition: serde_json::Value,
        tags: &[LifecycleTag],
    ) -> Self {
        Self {
            name: name.into(),
            action: ResourceAction { state, definition },
            tags: tags.iter().copied().collect(),
            kind,
        }
    }

    pub fn has_tag(&self, tag: LifecycleTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn state(&self) -> ResourceState {
        self.action.state
    }

    pub fn resource(&self) -> &serde_json::Value {
        &self.action.definition
    }
}

/// Ordered, tag-annotated tasks. Document order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TaskPlan {
    tasks: Vec<Task>,
}

impl TaskPlan {
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Tasks carrying `tag`, in document order
    pub fn with_tag(&self, tag: LifecycleTag) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.has_tag(tag)).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
