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

//! Kubernetes resource builders

pub mod deployment;
pub mod namespace;
pub mod pvc;
pub mod service;

pub use self::deployment::DeploymentBuilder;
pub use self::namespace::NamespaceBuilder;
pub use self::pvc::PvcBuilder;
pub use self::service::ServiceBuilder;

use crate::infrastructure::constants::{
    LABEL_APP, LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE, LABEL_SERVICE, VOLUME_SUFFIX_CLAIM,
};
use std::collections::BTreeMap;

/// Labels used to select a service's pods
pub fn selector_labels(project_name: &str, service: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_APP.to_string(), project_name.to_string());
    labels.insert(LABEL_SERVICE.to_string(), service.to_string());
    labels
}

pub fn service_labels(project_name: &str, service: &str) -> BTreeMap<String, String> {
    let mut labels = selector_labels(project_name, service);
    labels.insert(
        LABEL_MANAGED_BY.to_string(),
        LABEL_MANAGED_BY_VALUE.to_string(),
    );
    labels
}

pub fn claim_volume_name(volume: &str) -> String {
    format!("{}{}", volume, VOLUME_SUFFIX_CLAIM)
}
