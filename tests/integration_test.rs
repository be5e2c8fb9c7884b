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

#[cfg(test)]
mod tests {
    use kube_conductor::domain::plan::{ResourceKind, ResourceState};
    use kube_conductor::*;
    use std::path::{Path, PathBuf};

    fn web_db_model() -> ApplicationModel {
        ApplicationModel::new(vec![
            ServiceSpec::built("web", &["webapp"]),
            ServiceSpec::from_image("db", "postgres:13"),
        ])
        .unwrap()
    }

    fn engine_with(
        model: ApplicationModel,
        images: LocalImageIndex,
        default_kube_config: &Path,
    ) -> Engine<KubernetesBackend> {
        Engine::new(
            "shop",
            &NamespaceSettings::default(),
            model,
            KubernetesBackend::new("shop"),
            Box::new(images),
            Box::new(LocalFilesystem),
            default_kube_config,
        )
        .unwrap()
    }

    fn web_db_engine() -> Engine<KubernetesBackend> {
        let mut images = LocalImageIndex::new("shop");
        images.pin("web", "myapp/web:20240101");
        engine_with(web_db_model(), images, Path::new("/nonexistent/.kube/config"))
    }

    fn container_image(task: &Task) -> Option<&str> {
        task.resource()["spec"]["template"]["spec"]["containers"][0]["image"].as_str()
    }

    #[test]
    fn test_web_db_plan_order() {
        let mut engine = web_db_engine();
        let plan = engine.generate_plan(None, None).unwrap();

        let names: Vec<&str> = plan.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Create namespace shop",
                "Destroy namespace shop",
                "Create service web",
                "Create service db",
                "Stop deployment web",
                "Stop deployment db",
                "Start deployment web",
                "Start deployment db",
            ]
        );

        let tasks = plan.tasks();
        assert_eq!(tasks[0].state(), ResourceState::Present);
        assert_eq!(tasks[1].state(), ResourceState::Absent);
        assert!(tasks.iter().all(|t| t.kind != ResourceKind::PersistentVolumeClaim));

        assert_eq!(container_image(&tasks[6]), Some("myapp/web:20240101"));
        assert_eq!(container_image(&tasks[7]), Some("postgres:13"));
        assert_eq!(tasks[4].resource()["spec"]["replicas"], 0);
        assert_eq!(tasks[6].resource()["spec"]["replicas"], 1);

        assert_eq!(
            engine.model().service("web").unwrap().image.as_deref(),
            Some("myapp/web:20240101")
        );
    }

    #[test]
    fn test_tag_filtering() {
        let plan = web_db_engine().generate_plan(None, None).unwrap();

        let destroy = plan.with_tag(LifecycleTag::Destroy);
        assert_eq!(destroy.len(), 1);
        assert_eq!(destroy[0].name, "Destroy namespace shop");

        let stop = plan.with_tag(LifecycleTag::Stop);
        assert_eq!(stop.len(), 2);
        assert!(stop.iter().all(|t| t.kind == ResourceKind::Deployment));

        let restart: Vec<&str> = plan
            .with_tag(LifecycleTag::Restart)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            restart,
            vec![
                "Stop deployment web",
                "Stop deployment db",
                "Start deployment web",
                "Start deployment db",
            ]
        );

        assert_eq!(plan.with_tag(LifecycleTag::Start).len(), 5);
    }

    #[test]
    fn test_push_target_qualifies_built_images() {
        let mut engine = engine_with(
            web_db_model(),
            LocalImageIndex::new("shop"),
            Path::new("/nonexistent/.kube/config"),
        );
        let push = PushTarget::new("https://registry.example.com/", "team");

        let plan = engine.generate_plan(Some(&push), None).unwrap();
        let start_web = &plan.with_tag(LifecycleTag::Start)[3];
        assert_eq!(start_web.name, "Start deployment web");
        assert_eq!(
            container_image(start_web),
            Some("https://registry.example.com/team/shop-web")
        );
    }

    #[test]
    fn test_missing_build_artifact_aborts_plan() {
        let mut engine = engine_with(
            web_db_model(),
            LocalImageIndex::new("shop"),
            Path::new("/nonexistent/.kube/config"),
        );

        let err = engine.generate_plan(None, None).unwrap_err();
        match err {
            ConductorError::MissingBuildArtifact { service } => assert_eq!(service, "web"),
            other => panic!("unexpected error: {}", other),
        }
        assert!(engine.model().services().iter().all(|s| s.image.is_none()));
    }

    #[test]
    fn test_authorization_recorded_on_client() {
        let mut engine = web_db_engine();
        let auth = ClusterAuthConfig {
            host: Some("https://k8s.example.com:6443".to_string()),
            api_key: Some("token".to_string()),
            ..Default::default()
        };

        engine.generate_plan(None, Some(&auth)).unwrap();
        let profile = engine.backend().client().profile().unwrap();
        assert_eq!(profile.host.as_deref(), Some("https://k8s.example.com:6443"));
    }

    #[test]
    fn test_default_kube_config_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let config: PathBuf = dir.path().join("config");
        std::fs::write(&config, "apiVersion: v1\nkind: Config\n").unwrap();

        let engine = engine_with(web_db_model(), LocalImageIndex::new("shop"), &config);
        let manifest = engine.credential_mounts(None).unwrap();

        let json = serde_json::to_value(&manifest).unwrap();
        let host = config.to_string_lossy().to_string();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(
            json[host.as_str()],
            serde_json::json!({"bind": "/root/.kube/config", "mode": "ro"})
        );
    }

    #[test]
    fn test_explicit_auth_files_mounted_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config");
        std::fs::write(&config, "apiVersion: v1\nkind: Config\n").unwrap();

        let engine = engine_with(web_db_model(), LocalImageIndex::new("shop"), &config);
        let auth = ClusterAuthConfig {
            config_file: Some("/etc/k8s/admin.conf".to_string()),
            ssl_ca_cert: Some("/etc/k8s/ca.crt".to_string()),
            ..Default::default()
        };

        let manifest = engine.credential_mounts(Some(&auth)).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(manifest.get(&config.to_string_lossy()).is_none());
        assert_eq!(
            manifest.get("/etc/k8s/admin.conf").unwrap().bind,
            "/etc/k8s/admin.conf"
        );
        assert_eq!(manifest.get("/etc/k8s/ca.crt").unwrap().bind, "/etc/k8s/ca.crt");
    }

    #[test]
    fn test_missing_default_config_yields_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with(
            web_db_model(),
            LocalImageIndex::new("shop"),
            &dir.path().join("config"),
        );
        assert!(engine.credential_mounts(None).unwrap().is_empty());
    }
}
