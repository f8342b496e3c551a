//! `[project]` section configuration.
//!
//! Tells edgepack where the version string comes from.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[project]` section in edgepack.toml - version metadata.
///
/// # Example
/// ```toml
/// [project]
/// metadata = "package.json"   # or "Cargo.toml"
/// version = "1.2.3"           # skips the metadata file entirely
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Metadata file holding the version (`package.json` or `Cargo.toml`).
    #[serde(default = "defaults::project::metadata")]
    #[educe(Default = defaults::project::metadata())]
    pub metadata: PathBuf,

    /// Explicit version, wins over the metadata file.
    #[serde(default = "defaults::project::version")]
    #[educe(Default = defaults::project::version())]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::super::PackConfig;
    use std::path::PathBuf;

    #[test]
    fn test_project_config_defaults() {
        let config: PackConfig = toml::from_str("").unwrap();

        assert_eq!(config.project.metadata, PathBuf::from("package.json"));
        assert_eq!(config.project.version, None);
    }

    #[test]
    fn test_project_config_override() {
        let config = r#"
            [project]
            metadata = "Cargo.toml"
            version = "2.0.0-rc.1"
        "#;
        let config: PackConfig = toml::from_str(config).unwrap();

        assert_eq!(config.project.metadata, PathBuf::from("Cargo.toml"));
        assert_eq!(config.project.version.as_deref(), Some("2.0.0-rc.1"));
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [project]
            name = "panel"
        "#;
        let result: Result<PackConfig, _> = toml::from_str(config);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }
}
