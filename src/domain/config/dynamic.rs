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

use crate::domain::config::settings::Settings;
use std::collections::HashMap;

/// Apply `-D key=value` overrides on top of the project settings.
///
/// Supported keys: `project_name`, `k8s_namespace.{name,display_name,description}`
/// and `k8s_auth.<field>`. Unknown keys are logged and ignored.
pub fn apply_to_settings(configs: &HashMap<String, String>, settings: &mut Settings) {
    let mut keys: Vec<_> = configs.keys().collect();
    keys.sort();

    for key in keys {
        let value = &configs[key];
        match key.split_once('.') {
            None if key == "project_name" => settings.project_name = Some(value.clone()),
            Some(("k8s_namespace", "name")) => settings.k8s_namespace.name = Some(value.clone()),
            Some(("k8s_namespace", "display_name")) => {
                settings.k8s_namespace.display_name = Some(value.clone())
            }
            Some(("k8s_namespace", "description")) => {
                settings.k8s_namespace.description = Some(value.clone())
            }
            Some(("k8s_auth", field)) => {
                let auth = settings.k8s_auth.get_or_insert_with(Default::default);
                if !auth.set_field(field, value) {
                    tracing::warn!(key = %key, "ignoring unknown k8s_auth override");
                }
            }
            _ => tracing::warn!(key = %key, "ignoring unknown setting override"),
        }
    }
}

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();

    for config in configs {
        let (key, value) = config.split_once('=').ok_or_else(|| {
            format!("Invalid config format: '{}'. Expected 'key=value'", config)
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Empty key in config: '{}'", config));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let configs = parse_dynamic_configs(&[
            "k8s_namespace.name=shop-dev".to_string(),
            "k8s_auth.config_file=/etc/k8s/conf".to_string(),
            "project_name=shop".to_string(),
            "bogus.key=1".to_string(),
        ])
        .unwrap();

        let mut settings = Settings::default();
        apply_to_settings(&configs, &mut settings);

        assert_eq!(settings.project_name.as_deref(), Some("shop"));
        assert_eq!(settings.k8s_namespace.name.as_deref(), Some("shop-dev"));
        assert_eq!(
            settings.cluster_auth().and_then(|a| a.config_file.as_deref()),
            Some("/etc/k8s/conf")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_dynamic_configs(&["novalue".to_string()]).is_err());
        assert!(parse_dynamic_configs(&["=x".to_string()]).is_err());
        let map = parse_dynamic_configs(&["a=b=c".to_string()]).unwrap();
        assert_eq!(map["a"], "b=c");
    }
}
