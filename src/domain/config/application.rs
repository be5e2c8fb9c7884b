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

//! Application model: the services and named volumes of a project,
//! kept in declaration order.

use crate::domain::config::settings::Settings;
use crate::infrastructure::constants::{DEFAULT_REPLICAS, PROTOCOL_TCP};
use crate::shared::error::{ConductorError, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs::read_to_string;
use std::marker::PhantomData;
use std::path::Path;

// ============================================================================
// Project file
// ============================================================================

/// Parsed `container.yml` style project file
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(deserialize_with = "deserialize_ordered")]
    pub services: Vec<(String, ServiceSpec)>,
    #[serde(default, deserialize_with = "deserialize_ordered")]
    pub volumes: Vec<(String, VolumeSpec)>,
}

impl ProjectFile {
    /// Load a project description from a YAML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            ConductorError::config_error(format!(
                "Failed to read project file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Split into settings and a validated application model
    pub fn into_parts(self) -> Result<(Settings, ApplicationModel)> {
        let model = ApplicationModel::from_declarations(self.services, self.volumes)?;
        Ok((self.settings, model))
    }
}

fn deserialize_ordered<'de, D, V>(deserializer: D) -> std::result::Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct OrderedVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(
            self,
            mut map: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                if entries.iter().any(|(k, _): &(String, V)| *k == key) {
                    return Err(serde::de::Error::custom(format!("duplicate key '{}'", key)));
                }
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(OrderedVisitor(PhantomData))
}

// ============================================================================
// Application model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationModel {
    services: Vec<ServiceSpec>,
    volumes: Vec<NamedVolume>,
}

impl ApplicationModel {
    pub fn new(services: Vec<ServiceSpec>) -> Result<Self> {
        Self::with_volumes(services, Vec::new())
    }

    pub fn with_volumes(services: Vec<ServiceSpec>, volumes: Vec<NamedVolume>) -> Result<Self> {
        let model = Self { services, volumes };
        model.validate()?;
        Ok(model)
    }

    fn from_declarations(
        services: Vec<(String, ServiceSpec)>,
        volumes: Vec<(String, VolumeSpec)>,
    ) -> Result<Self> {
        let services = services
            .into_iter()
            .map(|(name, mut spec)| {
                spec.name = name;
                spec
            })
            .collect();
        let volumes = volumes
            .into_iter()
            .map(|(name, spec)| NamedVolume { name, spec })
            .collect();
        Self::with_volumes(services, volumes)
    }

    pub fn services(&self) -> &[ServiceSpec] {
        &self.services
    }

    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn volumes(&self) -> &[NamedVolume] {
        &self.volumes
    }

    pub fn volume(&self, name: &str) -> Option<&NamedVolume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Assign resolved image references. Services absent from `images`
    /// keep their current value.
    pub fn apply_images<'a, I>(&mut self, images: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, image) in images {
            if let Some(service) = self.services.iter_mut().find(|s| s.name == name) {
                service.image = Some(image.to_string());
            }
        }
    }

    fn validate(&self) -> Result<()> {
        for (idx, service) in self.services.iter().enumerate() {
            if self.services[..idx].iter().any(|s| s.name == service.name) {
                return Err(ConductorError::invalid_service(
                    &service.name,
                    "service is declared more than once",
                ));
            }
            service.validate()?;

            for mount in service.volume_mounts()? {
                if let VolumeMountSpec::Named { volume, .. } = &mount {
                    if self.volume(volume).is_none() {
                        return Err(ConductorError::invalid_service(
                            &service.name,
                            format!("references undeclared volume '{}'", volume),
                        ));
                    }
                }
            }
        }

        for volume in &self.volumes {
            if !is_valid_k8s_name(&volume.name) {
                return Err(ConductorError::config_error(format!(
                    "Invalid volume name '{}': must be a lowercase RFC 1123 label",
                    volume.name
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Service definition
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceSpec {
    #[serde(skip)]
    pub name: String,
    pub from: Option<String>,
    pub roles: Option<Vec<serde_yaml::Value>>,
    pub image: Option<String>,
    pub command: Option<CommandSpec>,
    pub entrypoint: Option<CommandSpec>,
    pub ports: Vec<Scalar>,
    pub environment: Option<EnvironmentSpec>,
    pub volumes: Vec<String>,
    pub working_dir: Option<String>,
    pub user: Option<String>,
    pub deploy: DeploySpec,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Service whose image comes from a pre-existing base image
    pub fn from_image(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            ..Self::new(name)
        }
    }

    /// Service whose image is produced by a build step
    pub fn built(name: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            roles: Some(
                roles
                    .iter()
                    .map(|r| serde_yaml::Value::String(r.to_string()))
                    .collect(),
            ),
            ..Self::new(name)
        }
    }

    /// A service with a non-empty role list has its image built locally.
    pub fn is_buildable(&self) -> bool {
        self.roles.as_ref().is_some_and(|r| !r.is_empty())
    }

    pub fn replicas(&self) -> i32 {
        self.deploy
            .replicas
            .unwrap_or(DEFAULT_REPLICAS)
    }

    pub fn port_mappings(&self) -> Result<Vec<PortMapping>> {
        self.ports
            .iter()
            .map(|p| {
                PortMapping::parse(&p.to_string())
                    .map_err(|e| ConductorError::invalid_service(&self.name, e.to_string()))
            })
            .collect()
    }

    pub fn environment_vars(&self) -> Vec<(String, String)> {
        match &self.environment {
            None => Vec::new(),
            Some(EnvironmentSpec::Map(entries)) => entries
                .iter()
                .map(|(k, v)| (k.clone(), v.as_ref().map(|v| v.to_string()).unwrap_or_default()))
                .collect(),
            Some(EnvironmentSpec::List(list)) => list
                .iter()
                .map(|entry| match entry.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (entry.clone(), String::new()),
                })
                .collect(),
        }
    }

    pub fn volume_mounts(&self) -> Result<Vec<VolumeMountSpec>> {
        self.volumes
            .iter()
            .map(|v| {
                VolumeMountSpec::parse(v)
                    .map_err(|e| ConductorError::invalid_service(&self.name, e.to_string()))
            })
            .collect()
    }

    /// Container `args`, from `command`
    pub fn command_args(&self) -> Result<Option<Vec<String>>> {
        self.split_command("command", self.command.as_ref())
    }

    /// Container `command`, from `entrypoint`
    pub fn entrypoint_args(&self) -> Result<Option<Vec<String>>> {
        self.split_command("entrypoint", self.entrypoint.as_ref())
    }

    fn split_command(&self, field: &str, spec: Option<&CommandSpec>) -> Result<Option<Vec<String>>> {
        spec.map(|c| {
            c.to_args().ok_or_else(|| {
                ConductorError::invalid_service(
                    &self.name,
                    format!("{} has unbalanced quotes", field),
                )
            })
        })
        .transpose()
    }

    fn validate(&self) -> Result<()> {
        if !is_valid_k8s_name(&self.name) || self.name.len() > 63 {
            return Err(ConductorError::invalid_service(
                &self.name,
                "name must be a lowercase RFC 1123 label (use '-' instead of '_')",
            ));
        }

        if !self.is_buildable() && self.from.as_deref().map_or(true, str::is_empty) {
            return Err(ConductorError::invalid_service(
                &self.name,
                "declares neither 'roles' nor 'from'",
            ));
        }

        if let Some(replicas) = self.deploy.replicas {
            if replicas < 0 {
                return Err(ConductorError::invalid_service(
                    &self.name,
                    "deploy.replicas must be >= 0",
                ));
            }
        }

        let mut seen = Vec::new();
        for port in self.port_mappings()? {
            let key = (port.published, port.protocol.clone());
            if seen.contains(&key) {
                return Err(ConductorError::invalid_service(
                    &self.name,
                    format!("port {}/{} is published more than once", key.0, key.1),
                ));
            }
            seen.push(key);
        }

        // YAML floats lose their spelling (1.10 reads back as 1.1).
        if let Some(EnvironmentSpec::Map(entries)) = &self.environment {
            if let Some((key, _)) = entries
                .iter()
                .find(|(_, v)| matches!(v, Some(Scalar::Float(_))))
            {
                return Err(ConductorError::invalid_service(
                    &self.name,
                    format!("environment value of '{}' is a number; quote this value", key),
                ));
            }
        }

        self.command_args()?;
        self.entrypoint_args()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeploySpec {
    pub replicas: Option<i32>,
}

/// Shell form (`"run --fast"`) or exec form (`["run", "--fast"]`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Shell(String),
    Exec(Vec<String>),
}

impl CommandSpec {
    /// Argument vector, splitting the shell form with shell quoting rules.
    /// `None` when the shell form has unbalanced quotes.
    pub fn to_args(&self) -> Option<Vec<String>> {
        match self {
            CommandSpec::Shell(s) => shlex::split(s),
            CommandSpec::Exec(v) => Some(v.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentSpec {
    Map(#[serde(deserialize_with = "deserialize_ordered")] Vec<(String, Option<Scalar>)>),
    List(Vec<String>),
}

/// YAML scalar that is consumed as text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

// ============================================================================
// Ports
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub published: i32,
    pub target: i32,
    pub protocol: String,
}

impl PortMapping {
    /// Parse `[ip:][published:]target[/protocol]`
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        use regex::Regex;

        let re = Regex::new(
            r"^(?:(?:\d{1,3}\.){3}\d{1,3}:)?(?:(?P<published>\d+):)?(?P<target>\d+)(?:/(?P<proto>tcp|udp|sctp))?$",
        )?;
        let caps = re
            .captures(s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unsupported port specification '{}'", s))?;

        let target: i32 = caps["target"].parse()?;
        let published: i32 = match caps.name("published") {
            Some(p) => p.as_str().parse()?,
            None => target,
        };
        for port in [published, target] {
            if !(1..=65535).contains(&port) {
                anyhow::bail!("Port {} out of range in '{}'", port, s);
            }
        }

        Ok(Self {
            published,
            target,
            protocol: caps
                .name("proto")
                .map_or(PROTOCOL_TCP.to_string(), |p| p.as_str().to_uppercase()),
        })
    }

    pub fn port_name(&self) -> String {
        format!("port-{}-{}", self.published, self.protocol.to_lowercase())
    }
}

// ============================================================================
// Volumes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NamedVolume {
    pub name: String,
    pub spec: VolumeSpec,
}

impl NamedVolume {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: VolumeSpec::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VolumeSpec {
    pub k8s: Option<ClaimOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClaimOptions {
    pub access_modes: Vec<String>,
    pub requested_storage: Option<String>,
    pub storage_class: Option<String>,
}

/// One entry of a service's `volumes` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeMountSpec {
    /// `name:/path[:ro]`, backed by a declared volume
    Named {
        volume: String,
        path: String,
        read_only: bool,
    },
    /// `/host:/path[:ro]`, `./rel:/path` or an anonymous `/path`
    HostOrAnonymous(String),
}

impl VolumeMountSpec {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let source = parts[0];
        if source.is_empty() {
            anyhow::bail!("Empty volume specification");
        }
        if parts.len() == 1 || source.starts_with(['/', '.', '~']) {
            return Ok(Self::HostOrAnonymous(s.to_string()));
        }

        let path = parts[1];
        if !path.starts_with('/') {
            anyhow::bail!("Volume '{}' must mount at an absolute path", s);
        }
        let read_only = match parts.get(2) {
            None | Some(&"rw") => false,
            Some(&"ro") => true,
            Some(mode) => anyhow::bail!("Unknown volume mode '{}' in '{}'", mode, s),
        };
        if parts.len() > 3 {
            anyhow::bail!("Incorrect volume format {}", s);
        }

        Ok(Self::Named {
            volume: source.to_string(),
            path: path.to_string(),
            read_only,
        })
    }
}

pub(crate) fn is_valid_k8s_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    if !name.chars().next().unwrap_or(' ').is_ascii_alphanumeric() {
        return false;
    }
    if !name.chars().last().unwrap_or(' ').is_ascii_alphanumeric() {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
version: "2"
settings:
  project_name: shop
services:
  web:
    from: centos:7
    roles:
      - web-server
    ports:
      - "8080:80"
      - 443
    environment:
      DEBUG: 1
      MODE: prod
    volumes:
      - static:/var/www/static:ro
      - /etc/localtime:/etc/localtime
  db:
    from: postgres:13
    command: postgres -c max_connections=50
volumes:
  static:
    k8s:
      requested_storage: 5Gi
"#;

    #[test]
    fn test_services_keep_declaration_order() {
        let (settings, model) = ProjectFile::from_yaml(PROJECT).unwrap().into_parts().unwrap();
        let names: Vec<_> = model.services().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["web", "db"]);
        assert_eq!(settings.project_name.as_deref(), Some("shop"));
        assert_eq!(model.volumes().len(), 1);
    }

    #[test]
    fn test_buildable_detection() {
        let (_, model) = ProjectFile::from_yaml(PROJECT).unwrap().into_parts().unwrap();
        assert!(model.service("web").unwrap().is_buildable());
        assert!(!model.service("db").unwrap().is_buildable());

        let mut empty_roles = ServiceSpec::from_image("cache", "redis:7");
        empty_roles.roles = Some(Vec::new());
        assert!(!empty_roles.is_buildable());
    }

    #[test]
    fn test_port_parsing() {
        let p = PortMapping::parse("8080:80").unwrap();
        assert_eq!((p.published, p.target), (8080, 80));
        assert_eq!(p.protocol, "TCP");

        let p = PortMapping::parse("53/udp").unwrap();
        assert_eq!((p.published, p.target), (53, 53));
        assert_eq!(p.protocol, "UDP");

        let p = PortMapping::parse("127.0.0.1:5000:5001").unwrap();
        assert_eq!((p.published, p.target), (5000, 5001));

        assert!(PortMapping::parse("8000-8010:80").is_err());
        assert!(PortMapping::parse("70000").is_err());
    }

    #[test]
    fn test_environment_forms() {
        let (_, model) = ProjectFile::from_yaml(PROJECT).unwrap().into_parts().unwrap();
        let env = model.service("web").unwrap().environment_vars();
        assert_eq!(
            env,
            vec![
                ("DEBUG".to_string(), "1".to_string()),
                ("MODE".to_string(), "prod".to_string())
            ]
        );

        let mut svc = ServiceSpec::from_image("worker", "busybox");
        svc.environment = Some(EnvironmentSpec::List(vec![
            "A=1".to_string(),
            "EMPTY".to_string(),
        ]));
        assert_eq!(
            svc.environment_vars(),
            vec![
                ("A".to_string(), "1".to_string()),
                ("EMPTY".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn test_environment_keeps_declaration_order() {
        let yaml = "services:\n  api:\n    from: python:3.12\n    environment:\n      ZETA: last\n      ALPHA: \"1.10\"\n      PORT: 8080\n";
        let (_, model) = ProjectFile::from_yaml(yaml).unwrap().into_parts().unwrap();
        assert_eq!(
            model.service("api").unwrap().environment_vars(),
            vec![
                ("ZETA".to_string(), "last".to_string()),
                ("ALPHA".to_string(), "1.10".to_string()),
                ("PORT".to_string(), "8080".to_string()),
            ]
        );
    }

    #[test]
    fn test_unquoted_float_environment_is_rejected() {
        let yaml = "services:\n  api:\n    from: python:3.12\n    environment:\n      VERSION: 1.10\n";
        let err = ProjectFile::from_yaml(yaml).unwrap().into_parts().unwrap_err();
        assert!(err.to_string().contains("quote this value"));
        assert_eq!(Scalar::Float(2.0).to_string(), "2.0");
    }

    #[test]
    fn test_shell_command_respects_quotes() {
        let cmd = CommandSpec::Shell(r#"sh -c "sleep 10; echo hi""#.to_string());
        assert_eq!(
            cmd.to_args().unwrap(),
            vec!["sh", "-c", "sleep 10; echo hi"]
        );

        let mut svc = ServiceSpec::from_image("worker", "busybox");
        svc.entrypoint = Some(CommandSpec::Shell(r#"sh -c "unterminated"#.to_string()));
        let err = ApplicationModel::new(vec![svc]).unwrap_err();
        assert!(matches!(err, ConductorError::InvalidService { ref reason, .. } if reason.contains("entrypoint")));
    }

    #[test]
    fn test_duplicate_published_ports_are_rejected() {
        let mut svc = ServiceSpec::from_image("web", "nginx");
        svc.ports = vec![Scalar::from("8080:80"), Scalar::from("8080:81")];
        assert!(ApplicationModel::new(vec![svc.clone()]).is_err());

        svc.ports = vec![Scalar::from("53:53"), Scalar::from("53:53/udp")];
        assert!(ApplicationModel::new(vec![svc]).is_ok());
    }

    #[test]
    fn test_volume_mount_parsing() {
        assert_eq!(
            VolumeMountSpec::parse("data:/var/lib/data:ro").unwrap(),
            VolumeMountSpec::Named {
                volume: "data".to_string(),
                path: "/var/lib/data".to_string(),
                read_only: true,
            }
        );
        assert!(matches!(
            VolumeMountSpec::parse("/srv:/srv").unwrap(),
            VolumeMountSpec::HostOrAnonymous(_)
        ));
        assert!(matches!(
            VolumeMountSpec::parse("/scratch").unwrap(),
            VolumeMountSpec::HostOrAnonymous(_)
        ));
        assert!(VolumeMountSpec::parse("data:relative").is_err());
        assert!(VolumeMountSpec::parse("data:/x:zz").is_err());
    }

    #[test]
    fn test_service_without_image_source_is_rejected() {
        let err = ApplicationModel::new(vec![ServiceSpec::new("orphan")]).unwrap_err();
        assert!(matches!(err, ConductorError::InvalidService { ref service, .. } if service == "orphan"));
    }

    #[test]
    fn test_undeclared_named_volume_is_rejected() {
        let mut svc = ServiceSpec::from_image("db", "postgres:13");
        svc.volumes = vec!["pgdata:/var/lib/postgresql/data".to_string()];
        assert!(ApplicationModel::new(vec![svc.clone()]).is_err());
        assert!(ApplicationModel::with_volumes(vec![svc], vec![NamedVolume::new("pgdata")]).is_ok());
    }

    #[test]
    fn test_invalid_service_names() {
        assert!(ApplicationModel::new(vec![ServiceSpec::from_image("my_db", "postgres")]).is_err());
        assert!(ApplicationModel::new(vec![
            ServiceSpec::from_image("db", "postgres"),
            ServiceSpec::from_image("db", "mysql"),
        ])
        .is_err());
    }

    #[test]
    fn test_apply_images() {
        let mut model = ApplicationModel::new(vec![
            ServiceSpec::built("web", &["app"]),
            ServiceSpec::from_image("db", "postgres:13"),
        ])
        .unwrap();
        model.apply_images([("web", "shop/web:1"), ("db", "postgres:13")]);
        assert_eq!(model.service("web").unwrap().image.as_deref(), Some("shop/web:1"));
        assert_eq!(model.service("db").unwrap().image.as_deref(), Some("postgres:13"));
    }
}
