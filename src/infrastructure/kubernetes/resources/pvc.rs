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

use crate::domain::config::NamedVolume;
use crate::infrastructure::constants::{
    DEFAULT_ACCESS_MODE, DEFAULT_STORAGE_SIZE, LABEL_APP, LABEL_MANAGED_BY,
    LABEL_MANAGED_BY_VALUE,
};
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

pub struct PvcBuilder<'a> {
    project_name: &'a str,
    namespace: &'a str,
    volume: &'a NamedVolume,
}

impl<'a> PvcBuilder<'a> {
    pub fn new(project_name: &'a str, namespace: &'a str, volume: &'a NamedVolume) -> Self {
        Self {
            project_name,
            namespace,
            volume,
        }
    }

    pub fn build(&self) -> PersistentVolumeClaim {
        let options = self.volume.spec.k8s.clone().unwrap_or_default();

        let access_modes = if options.access_modes.is_empty() {
            vec![DEFAULT_ACCESS_MODE.to_string()]
        } else {
            options.access_modes
        };
        let size = options
            .requested_storage
            .unwrap_or_else(|| DEFAULT_STORAGE_SIZE.to_string());

        let mut requests = BTreeMap::new();
        requests.insert("storage".to_string(), Quantity(size));

        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), self.project_name.to_string());
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );

        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(self.volume.name.clone()),
                namespace: Some(self.namespace.to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(access_modes),
                resources: Some(VolumeResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                storage_class_name: options.storage_class,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
