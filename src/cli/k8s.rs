//! Kubernetes lifecycle commands

use crate::cli::display::TableRenderer;
use crate::domain::config::{
    apply_to_settings, parse_dynamic_configs, ApplicationModel, ProjectFile, Settings,
};
use crate::domain::engine::{ClusterBackend, Engine, EntryPoint, ExecutionContext};
use crate::domain::image::PushTarget;
use crate::domain::mounts::{default_kube_config_path, LocalFilesystem};
use crate::infrastructure::images::LocalImageIndex;
use crate::infrastructure::kubernetes::KubernetesBackend;
use crate::infrastructure::playbook::Playbook;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Project file location and setting overrides shared by all project commands
#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to the project file
    #[arg(long, short = 'p', default_value = "container.yml")]
    pub project: PathBuf,

    /// Dynamic configuration properties to override project settings (-D key=value)
    ///
    /// Project: project_name
    /// Namespace: k8s_namespace.name, k8s_namespace.display_name, k8s_namespace.description
    /// Auth: k8s_auth.config_file, k8s_auth.context, k8s_auth.host, k8s_auth.api_key,
    ///       k8s_auth.ssl_ca_cert, k8s_auth.cert_file, k8s_auth.key_file,
    ///       k8s_auth.username, k8s_auth.password, k8s_auth.verify_ssl
    ///
    /// Example: -Dk8s_namespace.name=shop-dev -Dk8s_auth.context=staging
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

/// A loaded project with overrides applied
struct LoadedProject {
    name: String,
    settings: Settings,
    model: ApplicationModel,
}

impl ProjectArgs {
    fn load(&self) -> anyhow::Result<LoadedProject> {
        let project_file = ProjectFile::from_path(&self.project)
            .map_err(|e| anyhow::anyhow!("Failed to load project: {}", e))?;
        let (mut settings, model) = project_file
            .into_parts()
            .map_err(|e| anyhow::anyhow!("Invalid project: {}", e))?;

        if !self.properties.is_empty() {
            let configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_settings(&configs, &mut settings);
        }

        // Priority: -D project_name > settings.project_name > project directory name
        let name = settings
            .project_name
            .clone()
            .or_else(|| project_dir_name(&self.project))
            .ok_or_else(|| {
                anyhow::anyhow!("project_name is required (use -Dproject_name=<name>)")
            })?;

        tracing::debug!(project = %name, services = model.len(), "loaded project");
        Ok(LoadedProject {
            name,
            settings,
            model,
        })
    }
}

fn project_dir_name(project_file: &Path) -> Option<String> {
    let dir = project_file.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    dir.canonicalize()
        .unwrap_or(dir)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase())
}

fn ensure_context(entry: EntryPoint, current: ExecutionContext) -> anyhow::Result<()> {
    let required = entry.required_context();
    if required != current {
        anyhow::bail!(
            "{} may only run in the {} context (current context: {})",
            entry,
            required,
            current
        );
    }
    Ok(())
}

#[derive(Parser, Debug, Clone)]
pub struct PlanCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Registry URL the images were pushed to
    #[arg(long)]
    pub url: Option<String>,

    /// Registry namespace the images were pushed to
    #[arg(long)]
    pub registry_namespace: Option<String>,

    /// Image built for a service, as SERVICE=REFERENCE (repeatable)
    #[arg(long = "image", value_name = "SERVICE=REFERENCE")]
    pub images: Vec<String>,

    /// JSON index of locally built images
    #[arg(long, value_name = "PATH")]
    pub image_index: Option<PathBuf>,

    /// Write the playbook to this file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print a summary table of the planned tasks
    #[arg(long)]
    pub summary: bool,
}

impl PlanCommand {
    pub fn execute(&self, context: ExecutionContext) -> anyhow::Result<()> {
        ensure_context(EntryPoint::GeneratePlan, context)?;
        let project = self.project.load()?;

        let push_target = match (&self.url, &self.registry_namespace) {
            (None, None) => None,
            (url, namespace) => Some(
                PushTarget::from_parts(url.as_deref(), namespace.as_deref()).ok_or_else(|| {
                    anyhow::anyhow!("--url and --registry-namespace must be given together")
                })?,
            ),
        };

        let mut images = match &self.image_index {
            Some(path) => LocalImageIndex::load(&project.name, path)
                .map_err(|e| anyhow::anyhow!("Failed to load image index: {}", e))?,
            None => LocalImageIndex::new(&project.name),
        };
        for entry in &self.images {
            let (service, reference) = entry
                .split_once('=')
                .filter(|(s, r)| !s.trim().is_empty() && !r.trim().is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!("Invalid image '{}'. Expected 'service=reference'", entry)
                })?;
            images.pin(service.trim(), reference.trim());
        }

        let auth = project.settings.cluster_auth().cloned();
        let mut engine = Engine::new(
            &project.name,
            &project.settings.k8s_namespace,
            project.model,
            KubernetesBackend::new(&project.name),
            Box::new(images),
            Box::new(LocalFilesystem),
            default_kube_config_path().unwrap_or_default(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to create engine: {}", e))?;

        let plan = engine
            .generate_plan(push_target.as_ref(), auth.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to generate plan: {}", e))?;

        if self.summary {
            eprintln!("{}", TableRenderer::new().render_plan(engine.project_name(), &plan));
        }

        let document = Playbook::new(engine.project_name(), engine.display_name(), plan)
            .to_yaml()
            .map_err(|e| anyhow::anyhow!("Failed to render playbook: {}", e))?;

        match &self.output {
            Some(path) => {
                fs::write(path, document).map_err(|e| {
                    anyhow::anyhow!("Failed to write playbook {}: {}", path.display(), e)
                })?;
                tracing::info!(path = %path.display(), "wrote playbook");
            }
            None => print!("{}", document),
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct MountsCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Render a table instead of JSON
    #[arg(long)]
    pub summary: bool,
}

impl MountsCommand {
    pub fn execute(&self, context: ExecutionContext) -> anyhow::Result<()> {
        ensure_context(EntryPoint::CredentialMounts, context)?;
        let project = self.project.load()?;

        let default_config = default_kube_config_path().unwrap_or_else(|| {
            tracing::debug!("HOME is not set, skipping the default kube config");
            PathBuf::new()
        });
        let auth = project.settings.cluster_auth().cloned();
        let engine = Engine::new(
            &project.name,
            &project.settings.k8s_namespace,
            project.model,
            KubernetesBackend::new(&project.name),
            Box::new(LocalImageIndex::new(&project.name)),
            Box::new(LocalFilesystem),
            default_config,
        )
        .map_err(|e| anyhow::anyhow!("Failed to create engine: {}", e))?;

        let manifest = engine
            .credential_mounts(auth.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to resolve credential mounts: {}", e))?;

        if self.summary {
            println!("{}", TableRenderer::new().render_mounts(&manifest));
        } else {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CapabilitiesCommand {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl CapabilitiesCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let backend = KubernetesBackend::new(String::new());
        let capabilities = backend.capabilities();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&capabilities)?);
        } else {
            println!(
                "{}",
                TableRenderer::new().render_capabilities(backend.display_name(), &capabilities)
            );
        }
        Ok(())
    }
}
