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

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConductorError>;

#[derive(Error, Debug)]
pub enum ConductorError {
    #[error(
        "No image found for service {service}, make sure you've run a build for it before generating the plan"
    )]
    MissingBuildArtifact { service: String },

    #[error("Mount conflict: '{existing}' and '{incoming}' both resolve to target '{target}'")]
    AmbiguousMountConflict {
        existing: PathBuf,
        incoming: PathBuf,
        target: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid service '{service}': {reason}")]
    InvalidService { service: String, reason: String },

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Failed to resolve image for service '{service}': {source}")]
    ImageLookup {
        service: String,
        #[source]
        source: Box<ConductorError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ConductorError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn missing_build_artifact(service: impl Into<String>) -> Self {
        Self::MissingBuildArtifact {
            service: service.into(),
        }
    }

    pub fn invalid_service(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidService {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn mount_conflict(
        existing: impl Into<PathBuf>,
        incoming: impl Into<PathBuf>,
        target: impl Into<String>,
    ) -> Self {
        Self::AmbiguousMountConflict {
            existing: existing.into(),
            incoming: incoming.into(),
            target: target.into(),
        }
    }

    /// Attaches the service being resolved to a collaborator error.
    pub fn for_service(self, service: impl Into<String>) -> Self {
        match self {
            err @ (Self::MissingBuildArtifact { .. } | Self::ImageLookup { .. }) => err,
            other => Self::ImageLookup {
                service: service.into(),
                source: Box::new(other),
            },
        }
    }
}
