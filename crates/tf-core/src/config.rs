//! TOML configuration.
//!
//! Resolution order: explicit path → `TSFRAME_CONFIG` → `TSFRAME_CONFIG_DIR`
//! → XDG config directory → built-in defaults.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tf_codec::{Classifier, InvalidNameError, MarkerSet, NamingConvention};

use crate::assemble::{AssembleOptions, Assembler, GroupBy};
use crate::influx::{Precision, WriteOptions};
use crate::point::TagSet;
use crate::project::{ProjectOptions, Projector};

pub const ENV_CONFIG: &str = "TSFRAME_CONFIG";
pub const ENV_CONFIG_DIR: &str = "TSFRAME_CONFIG_DIR";
pub const CONFIG_FILENAME: &str = "tsframe.toml";
const APP_NAME: &str = "tsframe";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid naming configuration: {0}")]
    Invalid(#[from] InvalidNameError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Io { .. } => 70,
            ConfigError::Parse { .. } => 71,
            ConfigError::Invalid(_) => 72,
            ConfigError::Serialize(_) => 73,
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    /// `TSFRAME_CONFIG` or `TSFRAME_CONFIG_DIR`.
    Environment,
    XdgConfig,
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// `[metadata]`: roles of marker-prefixed columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
    /// Column -> tag key.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// `[write]`: projector and wire options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteConfig {
    #[serde(default)]
    pub zero_null: bool,
    #[serde(default)]
    pub ignore: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_measurement: Option<String>,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<String>,
    #[serde(default)]
    pub use_iso_format: bool,
    #[serde(default)]
    pub labels: TagSet,
}

/// `[read]`: assembler options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadConfig {
    #[serde(default)]
    pub group_by: GroupBy,
}

/// Complete tsframe configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TsFrameConfig {
    #[serde(default)]
    pub naming: NamingConvention,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub write: WriteConfig,
    #[serde(default)]
    pub read: ReadConfig,
}

/// A configuration together with its origin.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: TsFrameConfig,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
}

impl TsFrameConfig {
    /// Parse TOML text; `origin` only labels errors.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Resolve, load and report where the configuration came from.
    pub fn resolve(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let (path, source) = resolve_config_path(explicit);
        let config = match &path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        tracing::debug!(source = %source, path = ?path, "resolved configuration");
        Ok(LoadedConfig {
            config,
            source,
            path,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn marker_set(&self) -> MarkerSet {
        let mut markers = MarkerSet::new(self.naming);
        if let Some(prefix) = &self.metadata.tag_prefix {
            markers = markers.with_tag_prefix(prefix.clone());
        }
        for column in &self.metadata.excluded {
            markers = markers.with_excluded(column.clone());
        }
        for (column, key) in &self.metadata.tags {
            markers = markers.with_tag(column.clone(), key.clone());
        }
        markers
    }

    /// Validated classifier for this configuration.
    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        Ok(Classifier::new(self.marker_set())?)
    }

    pub fn project_options(&self) -> ProjectOptions {
        ProjectOptions {
            labels: self.write.labels.clone(),
            ignore: self.write.ignore.clone(),
            zero_null: self.write.zero_null,
            default_measurement: self.write.default_measurement.clone(),
        }
    }

    pub fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            group_by: self.read.group_by,
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            precision: self.write.precision,
            database: self.write.database.clone(),
            retention_policy: self.write.retention_policy.clone(),
            use_iso_format: self.write.use_iso_format,
        }
    }

    pub fn projector(&self) -> Result<Projector, ConfigError> {
        Ok(Projector::new(self.classifier()?, self.project_options()))
    }

    pub fn assembler(&self) -> Result<Assembler, ConfigError> {
        Ok(Assembler::new(self.classifier()?, self.assemble_options()))
    }
}

/// Find the configuration file using the process environment.
pub fn resolve_config_path(explicit: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    resolve_config_path_with(explicit, |key| std::env::var(key).ok(), dirs::config_dir())
}

/// Find the configuration file with an explicit environment.
///
/// An explicit path is returned even when it does not exist, so that
/// loading reports the missing file instead of silently using defaults.
pub fn resolve_config_path_with<F>(
    explicit: Option<&Path>,
    lookup: F,
    config_dir: Option<PathBuf>,
) -> (Option<PathBuf>, ConfigSource)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return (Some(path.to_path_buf()), ConfigSource::Explicit);
    }

    if let Some(path) = lookup(ENV_CONFIG).map(PathBuf::from) {
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = lookup(ENV_CONFIG_DIR) {
        let path = PathBuf::from(dir).join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = config_dir {
        let path = dir.join(APP_NAME).join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    (None, ConfigSource::BuiltinDefault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_codec::ColumnClass;

    const SAMPLE: &str = r#"
[naming]
marker = "_"
separator = "."

[metadata]
tag_prefix = "_tag_"
excluded = ["_tag_debug"]

[metadata.tags]
_sensor = "sensor_id"

[write]
zero_null = true
ignore = ["debug.raw"]
precision = "us"
database = "mydb"

[write.labels]
user_id = "42"

[read]
group_by = "timestamp"
"#;

    fn parse(text: &str) -> Result<TsFrameConfig, ConfigError> {
        TsFrameConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn test_sample_builds_runtime_objects() {
        let config = parse(SAMPLE).unwrap();
        let classifier = config.classifier().unwrap();
        assert_eq!(
            classifier.classify("_sensor").unwrap(),
            ColumnClass::Tag("sensor_id".into())
        );
        assert_eq!(
            classifier.classify("_tag_region").unwrap(),
            ColumnClass::Tag("region".into())
        );
        assert_eq!(classifier.classify("_tag_debug").unwrap(), ColumnClass::Excluded);

        let options = config.project_options();
        assert!(options.zero_null);
        assert!(options.ignore.contains("debug.raw"));
        assert_eq!(options.labels["user_id"], "42");

        let wire = config.write_options();
        assert_eq!(wire.precision, Precision::Us);
        assert_eq!(wire.database.as_deref(), Some("mydb"));
        assert_eq!(config.assemble_options().group_by, GroupBy::Timestamp);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = parse("").unwrap();
        assert_eq!(config, TsFrameConfig::default());
        assert_eq!(config.write.precision, Precision::Ms);
        assert!(!config.write.zero_null);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse("[write]\nzero_nul = true\n").unwrap_err();
        assert_eq!(err.code(), 71);
    }

    #[test]
    fn test_invalid_marker_set_fails_on_build() {
        let config = parse("[metadata.tags]\nsensor = \"sensor_id\"\n").unwrap();
        let err = config.classifier().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert_eq!(err.code(), 72);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = parse(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(parse(&text).unwrap(), config);
    }

    #[test]
    fn test_resolution_without_anything() {
        let (path, source) = resolve_config_path_with(None, |_| None, None);
        assert_eq!(path, None);
        assert_eq!(source, ConfigSource::BuiltinDefault);
        assert_eq!(source.to_string(), "builtin default");
    }

    #[test]
    fn test_explicit_path_wins_even_if_missing() {
        let missing = Path::new("/nonexistent/tsframe.toml");
        let (path, source) =
            resolve_config_path_with(Some(missing), |_| Some("/tmp".into()), None);
        assert_eq!(path.as_deref(), Some(missing));
        assert_eq!(source, ConfigSource::Explicit);
        assert_eq!(TsFrameConfig::load(missing).unwrap_err().code(), 70);
    }
}
