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

use super::{selector_labels, service_labels};
use crate::domain::config::ServiceSpec;
use crate::infrastructure::constants::{CLUSTER_IP_NONE, SERVICE_TYPE_CLUSTER_IP};
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec as K8sServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Builds the in-cluster Service fronting one application service.
///
/// Services without published ports become headless so their pods still
/// get stable DNS names.
pub struct ServiceBuilder<'a> {
    project_name: &'a str,
    namespace: &'a str,
    service: &'a ServiceSpec,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(project_name: &'a str, namespace: &'a str, service: &'a ServiceSpec) -> Self {
        Self {
            project_name,
            namespace,
            service,
        }
    }

    pub fn build(&self) -> Result<Service> {
        let ports: Vec<ServicePort> = self
            .service
            .port_mappings()?
            .into_iter()
            .map(|p| ServicePort {
                name: Some(p.port_name()),
                port: p.published,
                target_port: Some(IntOrString::Int(p.target)),
                protocol: Some(p.protocol),
                ..Default::default()
            })
            .collect();

        let cluster_ip = if ports.is_empty() {
            Some(CLUSTER_IP_NONE.to_string())
        } else {
            None
        };

        Ok(Service {
            metadata: ObjectMeta {
                name: Some(self.service.name.clone()),
                namespace: Some(self.namespace.to_string()),
                labels: Some(service_labels(self.project_name, &self.service.name)),
                ..Default::default()
            },
            spec: Some(K8sServiceSpec {
                type_: Some(SERVICE_TYPE_CLUSTER_IP.to_string()),
                cluster_ip,
                ports: if ports.is_empty() { None } else { Some(ports) },
                selector: Some(selector_labels(self.project_name, &self.service.name)),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}
