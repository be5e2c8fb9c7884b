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

//! Index of locally built images.
//!
//! The build step records each image it produces in a JSON file:
//!
//! ```json
//! [
//!   {"service": "web", "id": "sha256:...", "tags": ["shop-web:20240101"], "created": "2024-01-01T10:00:00Z"}
//! ]
//! ```

use crate::domain::config::ServiceSpec;
use crate::domain::image::{ImageCatalog, ImageReference};
use crate::shared::error::{ConductorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub service: String,
    #[serde(default)]
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct LocalImageIndex {
    project_name: String,
    records: Vec<ImageRecord>,
}

impl LocalImageIndex {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            records: Vec::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(project_name: impl Into<String>, path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            ConductorError::config_error(format!(
                "Failed to read image index {}: {}",
                path.display(),
                e
            ))
        })?;
        let records: Vec<ImageRecord> = serde_json::from_str(&content)?;
        Ok(Self {
            project_name: project_name.into(),
            records,
        })
    }

    /// Register an image reference built now, e.g. from `--image svc=ref`.
    pub fn pin(&mut self, service: impl Into<String>, tag: impl Into<String>) {
        self.records.push(ImageRecord {
            service: service.into(),
            id: None,
            tags: vec![tag.into()],
            created: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ImageCatalog for LocalImageIndex {
    fn latest_local_image(&self, service: &str) -> Result<Option<ImageReference>> {
        // Later records win ties on `created`.
        let latest = self
            .records
            .iter()
            .filter(|r| r.service == service)
            .fold(None::<&ImageRecord>, |best, r| match best {
                Some(b) if b.created > r.created => Some(b),
                _ => Some(r),
            });

        Ok(latest.map(|r| ImageReference {
            id: r.id.clone(),
            tags: r.tags.clone(),
        }))
    }

    fn canonical_image_name(&self, service: &ServiceSpec) -> String {
        format!("{}-{}", self.project_name, service.name)
    }
}
