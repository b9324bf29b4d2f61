use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the user's home that holds `config.toml`.
const CONFIG_DIR: &str = "~/.config/ua-gec";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings for the `ua-gec` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the annotated corpus (the directory holding `*.ann` files).
    pub corpus_path: PathBuf,
}

impl Config {
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
        }
    }

    /// Loads the config at `config_path`; `Ok(None)` if there is no such file.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Tilde and environment variables in the corpus path
        config.corpus_path = expand_path(&config.corpus_path).unwrap_or(config.corpus_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde(CONFIG_DIR).as_ref()).join("config.toml")
    }
}

fn expand_path(path: &Path) -> Option<PathBuf> {
    let path_str = path.to_string_lossy();
    shellexpand::full(&path_str)
        .ok()
        .map(|expanded| PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/ua-gec/config.toml"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::new("/data/ua-gec/gec-only");

        let toml_str = toml::to_string(&config).unwrap();
        assert_eq!(toml_str.trim(), r#"corpus_path = "/data/ua-gec/gec-only""#);

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = expand_path(Path::new("~/corpus/train")).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("corpus/train"));
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        assert_eq!(
            expand_path(Path::new("/absolute/path")).unwrap(),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            expand_path(Path::new("relative/path")).unwrap(),
            PathBuf::from("relative/path")
        );
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(temp_dir.path().join("nonexistent.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let config = Config::new("/tmp/ua-gec");

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_expands_env_var() {
        unsafe {
            env::set_var("UA_GEC_TEST_ROOT", "/custom/data");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "corpus_path = \"$UA_GEC_TEST_ROOT/gec-fluency\"\n").unwrap();

        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(loaded.corpus_path, PathBuf::from("/custom/data/gec-fluency"));

        unsafe {
            env::remove_var("UA_GEC_TEST_ROOT");
        }
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "corpus = 42\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
