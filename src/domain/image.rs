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

//! Image reference resolution for every service of an application.

use crate::domain::config::{ApplicationModel, ServiceSpec};
use crate::shared::error::{ConductorError, Result};
use serde::{Deserialize, Serialize};

/// Registry location images were pushed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    url: String,
    namespace: String,
}

impl PushTarget {
    pub fn new(url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: namespace.into(),
        }
    }

    /// A push target needs both a URL and a namespace.
    pub fn from_parts(url: Option<&str>, namespace: Option<&str>) -> Option<Self> {
        match (url, namespace) {
            (Some(url), Some(ns)) if !url.is_empty() && !ns.is_empty() => Some(Self::new(url, ns)),
            _ => None,
        }
    }

    pub fn reference_for(&self, image_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.url.trim_end_matches('/'),
            self.namespace,
            image_name
        )
    }
}

/// A locally built image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    #[serde(default)]
    pub id: Option<String>,
    pub tags: Vec<String>,
}

impl ImageReference {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tags: vec![tag.into()],
        }
    }

    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// Lookup of locally built images.
pub trait ImageCatalog {
    /// Most recent local build for the service, if any.
    fn latest_local_image(&self, service: &str) -> Result<Option<ImageReference>>;

    /// Repository name a service's image is pushed under.
    fn canonical_image_name(&self, service: &ServiceSpec) -> String;
}

/// Service name -> resolved image reference, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedImages {
    entries: Vec<(String, String)>,
}

impl ResolvedImages {
    pub fn get(&self, service: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, image)| image.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, i)| (n.as_str(), i.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct ImageResolver<'a> {
    catalog: &'a dyn ImageCatalog,
}

impl<'a> ImageResolver<'a> {
    pub fn new(catalog: &'a dyn ImageCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve every service without touching the model. The first
    /// failure aborts the whole resolution.
    pub fn resolve(
        &self,
        model: &ApplicationModel,
        push_target: Option<&PushTarget>,
    ) -> Result<ResolvedImages> {
        let mut resolved = ResolvedImages::default();

        for service in model.services() {
            let image = self.resolve_service(service, push_target)?;
            tracing::debug!(service = %service.name, image = %image, "resolved image");
            resolved.entries.push((service.name.clone(), image));
        }

        Ok(resolved)
    }

    fn resolve_service(
        &self,
        service: &ServiceSpec,
        push_target: Option<&PushTarget>,
    ) -> Result<String> {
        if !service.is_buildable() {
            return service.from.clone().ok_or_else(|| {
                ConductorError::invalid_service(&service.name, "declares neither 'roles' nor 'from'")
            });
        }

        if let Some(target) = push_target {
            return Ok(target.reference_for(&self.catalog.canonical_image_name(service)));
        }

        let image = self
            .catalog
            .latest_local_image(&service.name)
            .map_err(|e| e.for_service(&service.name))?;

        image
            .as_ref()
            .and_then(ImageReference::primary_tag)
            .map(str::to_string)
            .ok_or_else(|| ConductorError::missing_build_artifact(&service.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapCatalog(HashMap<&'static str, ImageReference>);

    impl ImageCatalog for MapCatalog {
        fn latest_local_image(&self, service: &str) -> Result<Option<ImageReference>> {
            Ok(self.0.get(service).cloned())
        }

        fn canonical_image_name(&self, service: &ServiceSpec) -> String {
            format!("myapp-{}", service.name)
        }
    }

    struct FailingCatalog;

    impl ImageCatalog for FailingCatalog {
        fn latest_local_image(&self, _service: &str) -> Result<Option<ImageReference>> {
            Err(ConductorError::config_error("image index unreadable"))
        }

        fn canonical_image_name(&self, service: &ServiceSpec) -> String {
            service.name.clone()
        }
    }

    fn model() -> ApplicationModel {
        ApplicationModel::new(vec![
            ServiceSpec::built("web", &["nginx"]),
            ServiceSpec::from_image("db", "postgres:13"),
        ])
        .unwrap()
    }

    #[test]
    fn test_local_artifact_primary_tag() {
        let catalog = MapCatalog(HashMap::from([(
            "web",
            ImageReference {
                id: Some("sha256:abc".to_string()),
                tags: vec!["myapp/web:20240101".to_string(), "myapp/web:latest".to_string()],
            },
        )]));
        let resolved = ImageResolver::new(&catalog).resolve(&model(), None).unwrap();
        assert_eq!(resolved.get("web"), Some("myapp/web:20240101"));
        assert_eq!(resolved.get("db"), Some("postgres:13"));
        let order: Vec<_> = resolved.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["web", "db"]);
    }

    #[test]
    fn test_push_target_reference() {
        let catalog = MapCatalog(HashMap::new());
        let target = PushTarget::new("https://registry.example.com/", "team");
        let resolved = ImageResolver::new(&catalog)
            .resolve(&model(), Some(&target))
            .unwrap();
        assert_eq!(
            resolved.get("web"),
            Some("https://registry.example.com/team/myapp-web")
        );
        assert_eq!(resolved.get("db"), Some("postgres:13"));
    }

    #[test]
    fn test_missing_artifact_names_service() {
        let catalog = MapCatalog(HashMap::new());
        let err = ImageResolver::new(&catalog).resolve(&model(), None).unwrap_err();
        match err {
            ConductorError::MissingBuildArtifact { service } => assert_eq!(service, "web"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_untagged_artifact_is_missing() {
        let catalog = MapCatalog(HashMap::from([(
            "web",
            ImageReference {
                id: Some("sha256:abc".to_string()),
                tags: Vec::new(),
            },
        )]));
        let err = ImageResolver::new(&catalog).resolve(&model(), None).unwrap_err();
        assert!(matches!(err, ConductorError::MissingBuildArtifact { .. }));
    }

    #[test]
    fn test_lookup_error_carries_service() {
        let err = ImageResolver::new(&FailingCatalog)
            .resolve(&model(), None)
            .unwrap_err();
        assert!(matches!(err, ConductorError::ImageLookup { ref service, .. } if service == "web"));
    }

    #[test]
    fn test_push_target_requires_both_parts() {
        assert!(PushTarget::from_parts(Some("reg.io"), None).is_none());
        assert!(PushTarget::from_parts(Some(""), Some("team")).is_none());
        assert_eq!(
            PushTarget::from_parts(Some("reg.io//"), Some("team"))
                .unwrap()
                .reference_for("app-web"),
            "reg.io/team/app-web"
        );
    }
}
