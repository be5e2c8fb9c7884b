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

use crate::domain::config::NamespaceIdentity;
use crate::infrastructure::constants::{
    ANNOTATION_DESCRIPTION, ANNOTATION_DISPLAY_NAME, LABEL_APP, LABEL_MANAGED_BY,
    LABEL_MANAGED_BY_VALUE,
};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

pub struct NamespaceBuilder<'a> {
    project_name: &'a str,
    namespace: &'a NamespaceIdentity,
}

impl<'a> NamespaceBuilder<'a> {
    pub fn new(project_name: &'a str, namespace: &'a NamespaceIdentity) -> Self {
        Self {
            project_name,
            namespace,
        }
    }

    pub fn build(&self) -> Namespace {
        let mut annotations = BTreeMap::new();
        if let Some(display_name) = self.namespace.display_name() {
            annotations.insert(ANNOTATION_DISPLAY_NAME.to_string(), display_name.to_string());
        }
        if let Some(description) = self.namespace.description() {
            annotations.insert(ANNOTATION_DESCRIPTION.to_string(), description.to_string());
        }

        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), self.project_name.to_string());
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );

        Namespace {
            metadata: ObjectMeta {
                name: Some(self.namespace.name().to_string()),
                labels: Some(labels),
                annotations: if annotations.is_empty() {
                    None
                } else {
                    Some(annotations)
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
