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
    use kube_conductor::domain::config::{apply_to_settings, parse_dynamic_configs};
    use kube_conductor::domain::plan::ResourceKind;
    use kube_conductor::*;
    use std::path::Path;

    const PROJECT: &str = r#"
version: "2"
settings:
  project_name: shop
  k8s_namespace:
    name: shop-dev
    display_name: Shop (dev)
    description: Storefront development environment
services:
  web:
    roles:
      - nginx
    ports:
      - "8080:80"
    command: ["nginx", "-g", "daemon off;"]
    environment:
      API_URL: http://api:5000
    volumes:
      - static:/usr/share/nginx/html:ro
      - /tmp/cache:/var/cache/nginx
  api:
    from: python:3.12
    ports:
      - "5000"
    working_dir: /srv
    environment:
      - DEBUG=1
  db:
    from: postgres:13
    volumes:
      - pgdata:/var/lib/postgresql/data
volumes:
  static: {}
  pgdata:
    k8s:
      access_modes: [ReadWriteMany]
      requested_storage: 5Gi
      storage_class: fast
"#;

    fn engine_for(settings: &Settings, model: ApplicationModel) -> Engine<KubernetesBackend> {
        let mut images = LocalImageIndex::new("shop");
        images.pin("web", "shop-web:20240101");
        Engine::new(
            settings.project_name.clone().unwrap(),
            &settings.k8s_namespace,
            model,
            KubernetesBackend::new("shop"),
            Box::new(images),
            Box::new(LocalFilesystem),
            Path::new("/nonexistent/.kube/config"),
        )
        .unwrap()
    }

    #[test]
    fn test_project_file_end_to_end() {
        let (settings, model) = ProjectFile::from_yaml(PROJECT).unwrap().into_parts().unwrap();
        let names: Vec<&str> = model.services().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["web", "api", "db"]);

        let mut engine = engine_for(&settings, model);
        assert_eq!(engine.namespace().name(), "shop-dev");

        let plan = engine.generate_plan(None, settings.cluster_auth()).unwrap();
        let tasks = plan.tasks();
        assert_eq!(tasks.len(), 2 + 3 + 3 + 3 + 2);

        let ns = tasks[0].resource();
        assert_eq!(ns["metadata"]["name"], "shop-dev");
        assert_eq!(
            ns["metadata"]["annotations"]["openshift.io/display-name"],
            "Shop (dev)"
        );

        let web_svc = tasks[2].resource();
        assert_eq!(web_svc["spec"]["ports"][0]["port"], 8080);
        assert_eq!(web_svc["spec"]["ports"][0]["targetPort"], 80);
        let db_svc = tasks[4].resource();
        assert_eq!(db_svc["spec"]["clusterIP"], "None");

        let start_web = tasks[8].resource();
        assert_eq!(tasks[8].name, "Start deployment web");
        assert_eq!(start_web["spec"]["strategy"]["type"], "Recreate");
        let container = &start_web["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(container["image"], "shop-web:20240101");
        assert_eq!(container["args"][2], "daemon off;");
        assert_eq!(container["env"][0]["name"], "API_URL");
        let mounts = container["volumeMounts"].as_array().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0]["mountPath"], "/usr/share/nginx/html");
        assert_eq!(mounts[0]["readOnly"], true);
        assert_eq!(
            start_web["spec"]["template"]["spec"]["volumes"][0]["persistentVolumeClaim"]
                ["claimName"],
            "static"
        );

        let api = &tasks[9].resource()["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(api["image"], "python:3.12");
        assert_eq!(api["workingDir"], "/srv");
        assert_eq!(api["env"][0]["value"], "1");

        let claims: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.kind == ResourceKind::PersistentVolumeClaim)
            .collect();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].name, "Create volume claim static");
        let pgdata = claims[1].resource();
        assert_eq!(pgdata["spec"]["accessModes"][0], "ReadWriteMany");
        assert_eq!(pgdata["spec"]["resources"]["requests"]["storage"], "5Gi");
        assert_eq!(pgdata["spec"]["storageClassName"], "fast");
        assert!(claims.iter().all(|t| t.has_tag(LifecycleTag::Start)));
    }

    #[test]
    fn test_overrides_and_playbook() {
        let (mut settings, model) = ProjectFile::from_yaml(PROJECT).unwrap().into_parts().unwrap();
        let overrides = parse_dynamic_configs(&[
            "k8s_namespace.name=shop-staging".to_string(),
            "k8s_auth.host=https://k8s.example.com".to_string(),
            "k8s_auth.api_key=secret".to_string(),
        ])
        .unwrap();
        apply_to_settings(&overrides, &mut settings);

        let mut engine = engine_for(&settings, model);
        let plan = engine.generate_plan(None, settings.cluster_auth()).unwrap();
        assert_eq!(plan.tasks()[0].name, "Create namespace shop-staging");
        assert!(engine.backend().client().profile().is_some());

        let yaml = Playbook::new(engine.project_name(), engine.display_name(), plan)
            .to_yaml()
            .unwrap();
        let plays: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(plays[0]["name"], "Manage the lifecycle of shop on K8s");
        assert_eq!(plays[0]["roles"][0]["role"], "kubernetes-modules");
        assert_eq!(plays[0]["tasks"][1]["tags"][0], "destroy");
        assert_eq!(plays[0]["tasks"][1]["k8s"]["state"], "absent");
    }

    #[test]
    fn test_invalid_projects_rejected() {
        let missing_source = "services:\n  web:\n    ports: [\"80\"]\n";
        let err = ProjectFile::from_yaml(missing_source)
            .unwrap()
            .into_parts()
            .unwrap_err();
        assert!(matches!(err, ConductorError::InvalidService { ref service, .. } if service == "web"));

        let bad_name = "services:\n  web_app:\n    from: nginx\n";
        assert!(ProjectFile::from_yaml(bad_name).unwrap().into_parts().is_err());

        let undeclared = "services:\n  db:\n    from: postgres:13\n    volumes: [\"pgdata:/data\"]\n";
        assert!(ProjectFile::from_yaml(undeclared).unwrap().into_parts().is_err());

        let duplicate = "services:\n  db:\n    from: a\n  db:\n    from: b\n";
        assert!(ProjectFile::from_yaml(duplicate).is_err());
    }
}
