//! Configuration handling for the proto tool.
//!
//! Settings come from the shared reDB config file and then from environment
//! variables, which take precedence.

use anyhow::Result;
use proto_codec::CodecConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Proto tool configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtoConfig {
    /// Decoder and encoder limits
    pub codec: CodecConfig,
    /// Schema used when `--schema` is not given
    pub schema: Option<PathBuf>,
}

/// Root configuration structure (matches the YAML structure)
#[derive(Debug, Deserialize)]
struct RootConfig {
    services: Option<ServicesConfig>,
}

#[derive(Debug, Deserialize)]
struct ServicesConfig {
    proto: Option<ServiceConfig>,
}

#[derive(Debug, Deserialize)]
struct ServiceConfig {
    config: Option<HashMap<String, String>>,
}

impl ProtoConfig {
    /// Load configuration from file and environment variables
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config = Self::default();
        let path = config_path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<RootConfig>(&content) {
                Ok(root_config) => {
                    config.apply_root_config(root_config);
                    info!("Loaded configuration from {:?}", path);
                }
                Err(err) => warn!(
                    "Failed to parse config file {:?}, using defaults: {}",
                    path, err
                ),
            },
            Err(_) => warn!("Config file {:?} not found, using defaults", path),
        }

        config.apply_overrides(|key| std::env::var(key).ok());

        info!(
            "Final proto configuration: max_depth={}, max_message_size={}, schema={:?}",
            config.codec.max_depth, config.codec.max_message_size, config.schema
        );

        Ok(config)
    }

    fn apply_root_config(&mut self, root_config: RootConfig) {
        let Some(config_map) = root_config
            .services
            .and_then(|services| services.proto)
            .and_then(|service| service.config)
        else {
            return;
        };

        for (key, value) in config_map {
            match key.as_str() {
                "services.proto.max_depth" => match value.parse() {
                    Ok(depth) => self.codec.max_depth = depth,
                    Err(_) => warn!("Ignoring invalid {}: {}", key, value),
                },
                "services.proto.max_message_size" => match value.parse() {
                    Ok(size) => self.codec.max_message_size = size,
                    Err(_) => warn!("Ignoring invalid {}: {}", key, value),
                },
                "services.proto.schema" => self.schema = Some(PathBuf::from(value)),
                _ => {
                    // Ignore unknown configuration keys
                }
            }
        }
    }

    /// Apply `PROTO_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(depth) = lookup("PROTO_MAX_DEPTH").and_then(|v| v.parse().ok()) {
            self.codec.max_depth = depth;
            info!("Max depth overridden by environment: {}", depth);
        }

        if let Some(size) = lookup("PROTO_MAX_MESSAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.codec.max_message_size = size;
            info!("Max message size overridden by environment: {}", size);
        }

        if let Some(schema) = lookup("PROTO_SCHEMA") {
            info!("Schema overridden by environment: {}", schema);
            self.schema = Some(PathBuf::from(schema));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto_codec::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_MESSAGE_SIZE};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(yaml: &str) -> ProtoConfig {
        let mut config = ProtoConfig::default();
        config.apply_root_config(serde_yaml::from_str(yaml).unwrap());
        config
    }

    #[test]
    fn test_default_config() {
        let config = ProtoConfig::default();
        assert_eq!(config.codec.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.codec.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.schema, None);
    }

    #[test]
    fn test_load_from_file() {
        let yaml_content = r#"
supervisor:
  port: 50000

services:
  proto:
    enabled: true
    config:
      services.proto.max_depth: "16"
      services.proto.max_message_size: "4096"
      services.proto.schema: "schemas/person.yaml"
  mesh:
    config:
      services.mesh.node_id: "2001"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = ProtoConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.codec.max_depth, 16);
        assert_eq!(config.codec.max_message_size, 4096);
        assert_eq!(config.schema, Some(PathBuf::from("schemas/person.yaml")));
    }

    #[test]
    fn test_invalid_values_ignored() {
        let config = parse(
            r#"
services:
  proto:
    config:
      services.proto.max_depth: "deep"
      services.proto.unknown: "x"
"#,
        );
        assert_eq!(config, ProtoConfig::default());
    }

    #[test]
    fn test_missing_service_section() {
        assert_eq!(parse("services: {}\n"), ProtoConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = parse(
            r#"
services:
  proto:
    config:
      services.proto.max_depth: "16"
"#,
        );
        let env: HashMap<&str, &str> = [
            ("PROTO_MAX_DEPTH", "4"),
            ("PROTO_MAX_MESSAGE_SIZE", "not-a-number"),
            ("PROTO_SCHEMA", "/etc/redb/schema.yaml"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.codec.max_depth, 4);
        assert_eq!(config.codec.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.schema, Some(PathBuf::from("/etc/redb/schema.yaml")));
    }
}
