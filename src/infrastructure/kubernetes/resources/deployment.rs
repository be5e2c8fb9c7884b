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

use super::{claim_volume_name, selector_labels, service_labels};
use crate::domain::config::{ServiceSpec, VolumeMountSpec};
use crate::infrastructure::constants::{STOPPED_REPLICAS, STRATEGY_TYPE_RECREATE};
use crate::shared::error::{ConductorError, Result};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PersistentVolumeClaimVolumeSource, PodSpec,
    PodTemplateSpec, SecurityContext, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

pub struct DeploymentBuilder<'a> {
    project_name: &'a str,
    namespace: &'a str,
    service: &'a ServiceSpec,
    stopped: bool,
}

impl<'a> DeploymentBuilder<'a> {
    pub fn new(project_name: &'a str, namespace: &'a str, service: &'a ServiceSpec) -> Self {
        Self {
            project_name,
            namespace,
            service,
            stopped: false,
        }
    }

    /// Scale to zero instead of the declared replica count
    pub fn stopped(mut self, stopped: bool) -> Self {
        self.stopped = stopped;
        self
    }

    pub fn build(&self) -> Result<Deployment> {
        let replicas = if self.stopped {
            STOPPED_REPLICAS
        } else {
            self.service.replicas()
        };

        let (volumes, volume_mounts) = self.build_volumes()?;

        let pod_spec = PodSpec {
            containers: vec![self.build_container(volume_mounts)?],
            volumes: if volumes.is_empty() { None } else { Some(volumes) },
            ..Default::default()
        };

        Ok(Deployment {
            metadata: ObjectMeta {
                name: Some(self.service.name.clone()),
                namespace: Some(self.namespace.to_string()),
                labels: Some(service_labels(self.project_name, &self.service.name)),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(replicas),
                selector: LabelSelector {
                    match_labels: Some(selector_labels(self.project_name, &self.service.name)),
                    ..Default::default()
                },
                strategy: Some(DeploymentStrategy {
                    type_: Some(STRATEGY_TYPE_RECREATE.to_string()),
                    ..Default::default()
                }),
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(service_labels(self.project_name, &self.service.name)),
                        ..Default::default()
                    }),
                    spec: Some(pod_spec),
                },
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn build_container(&self, volume_mounts: Vec<VolumeMount>) -> Result<Container> {
        let image = self.service.image.clone().ok_or_else(|| {
            ConductorError::invalid_service(&self.service.name, "image has not been resolved")
        })?;

        let env: Vec<EnvVar> = self
            .service
            .environment_vars()
            .into_iter()
            .map(|(name, value)| EnvVar {
                name,
                value: Some(value),
                ..Default::default()
            })
            .collect();

        let ports: Vec<ContainerPort> = self
            .service
            .port_mappings()?
            .into_iter()
            .map(|p| ContainerPort {
                container_port: p.target,
                protocol: Some(p.protocol),
                ..Default::default()
            })
            .collect();

        let security_context = match self.service.user.as_deref() {
            None => None,
            Some(user) => match user.parse::<i64>() {
                Ok(uid) => Some(SecurityContext {
                    run_as_user: Some(uid),
                    ..Default::default()
                }),
                Err(_) => {
                    tracing::warn!(
                        service = %self.service.name,
                        user,
                        "non-numeric user cannot be expressed as runAsUser, skipping"
                    );
                    None
                }
            },
        };

        Ok(Container {
            name: self.service.name.clone(),
            image: Some(image),
            command: self.service.entrypoint_args()?,
            args: self.service.command_args()?,
            env: if env.is_empty() { None } else { Some(env) },
            ports: if ports.is_empty() { None } else { Some(ports) },
            working_dir: self.service.working_dir.clone(),
            volume_mounts: if volume_mounts.is_empty() {
                None
            } else {
                Some(volume_mounts)
            },
            security_context,
            ..Default::default()
        })
    }

    fn build_volumes(&self) -> Result<(Vec<Volume>, Vec<VolumeMount>)> {
        let mut volumes: Vec<Volume> = Vec::new();
        let mut mounts = Vec::new();

        for mount in self.service.volume_mounts()? {
            match mount {
                VolumeMountSpec::Named {
                    volume,
                    path,
                    read_only,
                } => {
                    let name = claim_volume_name(&volume);
                    if !volumes.iter().any(|v| v.name == name) {
                        volumes.push(Volume {
                            name: name.clone(),
                            persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                                claim_name: volume,
                                read_only: None,
                            }),
                            ..Default::default()
                        });
                    }
                    mounts.push(VolumeMount {
                        name,
                        mount_path: path,
                        read_only: if read_only { Some(true) } else { None },
                        ..Default::default()
                    });
                }
                VolumeMountSpec::HostOrAnonymous(spec) => {
                    tracing::warn!(
                        service = %self.service.name,
                        volume = %spec,
                        "host and anonymous volumes are not deployed to the cluster"
                    );
                }
            }
        }

        Ok((volumes, mounts))
    }
}
