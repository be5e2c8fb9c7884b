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

/// Credential mounts
pub const DEFAULT_KUBE_CONFIG_RELATIVE: &str = ".kube/config";
pub const KUBE_CONFIG_MOUNT_TARGET: &str = "/root/.kube/config";
pub const MOUNT_MODE_READ_ONLY: &str = "ro";

/// Engine display name
pub const ENGINE_DISPLAY_NAME: &str = "K8s";

/// Playbook layout
pub const PLAY_HOSTS: &str = "localhost";
pub const PLAY_CONNECTION: &str = "local";
pub const PLAY_GATHER_FACTS: &str = "no";
pub const PLAY_ROLE: &str = "kubernetes-modules";

/// Task states
pub const STATE_PRESENT: &str = "present";
pub const STATE_ABSENT: &str = "absent";

/// Deployment defaults
pub const DEFAULT_REPLICAS: i32 = 1;
pub const STOPPED_REPLICAS: i32 = 0;
pub const STRATEGY_TYPE_RECREATE: &str = "Recreate";

/// Default PVC settings
pub const DEFAULT_STORAGE_SIZE: &str = "1Gi";
pub const DEFAULT_ACCESS_MODE: &str = "ReadWriteOnce";

/// Resource labels
pub const LABEL_APP: &str = "app";
pub const LABEL_SERVICE: &str = "service";
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const LABEL_MANAGED_BY_VALUE: &str = "kube-conductor";

/// Namespace annotations understood by OpenShift-flavoured clusters
pub const ANNOTATION_DISPLAY_NAME: &str = "openshift.io/display-name";
pub const ANNOTATION_DESCRIPTION: &str = "openshift.io/description";

/// Service settings
pub const SERVICE_TYPE_CLUSTER_IP: &str = "ClusterIP";
pub const CLUSTER_IP_NONE: &str = "None";
pub const PROTOCOL_TCP: &str = "TCP";

/// Volume name suffix for PVC-backed mounts
pub const VOLUME_SUFFIX_CLAIM: &str = "-claim";
