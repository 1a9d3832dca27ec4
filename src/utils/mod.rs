/// Configuration constants for the application
pub mod config {
    /// Directory under the user's config dir holding glance settings
    pub const SETTINGS_DIR: &str = "kube-glance";

    /// Settings file name
    pub const SETTINGS_FILE: &str = "config.toml";

    /// Default log directive when neither RUST_LOG nor -v is given
    pub const DEFAULT_LOG_FILTER: &str = "error,kube_glance=warn";
}

/// Persistent user settings, overridable on the command line
pub mod settings {
    use super::config::*;
    use crate::contexts::{GlanceError, GlanceResult};
    use crate::k8s::{AggregationMode, MemorySource};
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
    #[serde(rename_all = "kebab-case")]
    pub enum OutputFormat {
        #[default]
        Table,
        Json,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(default, deny_unknown_fields)]
    pub struct Settings {
        pub mode: AggregationMode,
        pub output: OutputFormat,
        pub memory_source: MemorySource,
        pub color: bool,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                mode: AggregationMode::default(),
                output: OutputFormat::default(),
                memory_source: MemorySource::default(),
                color: true,
            }
        }
    }

    impl Settings {
        /// Loads settings from `path`, or from the default location when none is given.
        ///
        /// A missing default file means defaults; a missing explicit file is an error.
        pub fn load(path: Option<&Path>) -> GlanceResult<Self> {
            match path {
                Some(path) => Self::from_file(path),
                None => match default_settings_path() {
                    Some(path) if path.exists() => Self::from_file(&path),
                    _ => Ok(Self::default()),
                },
            }
        }

        pub fn from_file(path: &Path) -> GlanceResult<Self> {
            let contents = fs::read_to_string(path).map_err(|e| {
                GlanceError::Settings(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Self::from_toml(&contents)
                .map_err(|e| GlanceError::Settings(format!("{}: {}", path.display(), e)))
        }

        pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
            toml::from_str(contents)
        }
    }

    /// `<config dir>/kube-glance/config.toml`, when the platform has a config dir
    pub fn default_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::settings::*;
    use crate::contexts::GlanceError;
    use crate::k8s::{AggregationMode, MemorySource};
    use std::path::Path;

    #[test]
    fn test_empty_settings_are_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.color);
        assert_eq!(settings.mode, AggregationMode::ClusterWide);
        assert_eq!(settings.memory_source, MemorySource::Capacity);
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = Settings::from_toml(
            r#"
mode = "per-namespace"
output = "json"
memory_source = "allocatable"
color = false
"#,
        )
        .unwrap();

        assert_eq!(settings.mode, AggregationMode::PerNamespace);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.memory_source, MemorySource::Allocatable);
        assert!(!settings.color);
    }

    #[test]
    fn test_settings_reject_unknown_values() {
        assert!(Settings::from_toml(r#"mode = "sideways""#).is_err());
        assert!(Settings::from_toml(r#"colour = true"#).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/glance.toml")));
        assert!(matches!(result, Err(GlanceError::Settings(_))));
    }

    #[test]
    fn test_default_settings_path() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("kube-glance/config.toml"));
        }
    }
}
