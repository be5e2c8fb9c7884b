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

//! Playbook document wrapping a task plan

use crate::domain::plan::{LifecycleTag, Task, TaskPlan};
use crate::infrastructure::constants::{
    PLAY_CONNECTION, PLAY_GATHER_FACTS, PLAY_HOSTS, PLAY_ROLE,
};
use crate::shared::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleRef {
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Play {
    pub name: String,
    pub hosts: String,
    pub gather_facts: String,
    pub connection: String,
    pub roles: Vec<RoleRef>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone)]
pub struct Playbook {
    plays: Vec<Play>,
    generated_at: DateTime<Utc>,
}

impl Playbook {
    pub fn new(project_name: &str, display_name: &str, plan: TaskPlan) -> Self {
        let play = Play {
            name: format!("Manage the lifecycle of {} on {}", project_name, display_name),
            hosts: PLAY_HOSTS.to_string(),
            gather_facts: PLAY_GATHER_FACTS.to_string(),
            connection: PLAY_CONNECTION.to_string(),
            roles: vec![RoleRef {
                role: PLAY_ROLE.to_string(),
            }],
            tasks: plan.into_tasks(),
        };

        Self {
            plays: vec![play],
            generated_at: Utc::now(),
        }
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Render as YAML, prefixed with a comment header naming the valid tags.
    pub fn to_yaml(&self) -> Result<String> {
        let tags = LifecycleTag::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut output = String::new();
        output.push_str(&format!(
            "# Generated by kube-conductor at {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!("# Valid tags: {}\n", tags));
        output.push_str(&serde_yaml::to_string(&self.plays)?);
        Ok(output)
    }
}
