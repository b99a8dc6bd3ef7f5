use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CANONICAL_ORDER: [&str; 5] = ["GT", "AD", "DP", "GQ", "PL"];
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

///
/// Settings shared by every subcommand, read from a TOML file.
///
/// Flags given on the command line override the file.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VartkConfig {
    /// FORMAT key order used by `reorder`
    pub canonical_order: Vec<String>,
    /// worker threads; rayon's default when unset
    pub threads: Option<usize>,
    /// ranges kept by the reference sequence cache
    pub cache_capacity: usize,
    /// records handed to the worker pool at a time
    pub chunk_size: usize,
}

impl Default for VartkConfig {
    fn default() -> Self {
        VartkConfig {
            canonical_order: DEFAULT_CANONICAL_ORDER.iter().map(|k| k.to_string()).collect(),
            threads: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file must have a `toml` extension")]
    InvalidFileType,
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl VartkConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue("chunk_size must be positive".to_string()));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue("threads must be positive".to_string()));
        }
        Ok(self)
    }
}

impl TryFrom<&Path> for VartkConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        if path.extension().and_then(OsStr::to_str) != Some("toml") {
            return Err(ConfigError::InvalidFileType);
        }
        let raw = read_to_string(path)?;
        let config: VartkConfig = toml::from_str(&raw)?;
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn write(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[rstest]
    fn test_partial_file_keeps_defaults() {
        let (_dir, path) = write("vartk.toml", "canonical_order = [\"GT\", \"DP\"]\nthreads = 4\n");
        let config = VartkConfig::try_from(path.as_path()).unwrap();

        assert_eq!(config.canonical_order, vec!["GT", "DP"]);
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[rstest]
    fn test_defaults() {
        let config = VartkConfig::default();
        assert_eq!(config.canonical_order, vec!["GT", "AD", "DP", "GQ", "PL"]);
    }

    #[rstest]
    #[case("vartk.yaml", "threads = 2\n")]
    #[case("vartk.toml", "chunk_size = 0\n")]
    #[case("vartk.toml", "threads = \"many\"\n")]
    fn test_rejected_configs(#[case] name: &str, #[case] content: &str) {
        let (_dir, path) = write(name, content);
        assert!(VartkConfig::try_from(path.as_path()).is_err());
    }
}
