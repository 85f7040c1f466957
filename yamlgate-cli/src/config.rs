use std::path::{Path, PathBuf};

use thiserror::Error;
use yamlgate_core::ValidatorOptions;

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

/// Reads validator options from the `[validator]` table of a TOML file. Keys
/// that are absent keep their defaults; unknown tables are rejected.
pub fn load_options<P: AsRef<Path>>(config_path: P) -> Result<ValidatorOptions, ConfigError> {
    let config_path = config_path.as_ref();
    let content =
        std::fs::read_to_string(config_path).map_err(|source| ConfigError::ConfigReadError {
            config_path: config_path.to_path_buf(),
            source,
        })?;

    let options = parse_options(&content).map_err(|source| ConfigError::ConfigParseError {
        config_path: config_path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded options from {}: {options:?}", config_path.display());
    Ok(options)
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    validator: ValidatorOptions,
}

fn parse_options(content: &str) -> Result<ValidatorOptions, toml::de::Error> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(file.validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use yamlgate_core::RunMode;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        assert_eq!(load_options(file.path()).unwrap(), ValidatorOptions::default());
    }

    #[test]
    fn reads_validator_table() {
        let file = write_config(
            "[validator]\nmode = \"fail_fast\"\nallow_top_level_sequence = true\n",
        );
        let options = load_options(file.path()).unwrap();
        assert_eq!(options.mode, RunMode::FailFast);
        assert!(options.allow_top_level_sequence);
        assert!(options.strict_sibling_homogeneity);
        assert!(options.retain_tree);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let file = write_config("[validator]\nmode = \"sometimes\"\n");
        let err = load_options(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn misspelled_table_is_a_parse_error() {
        let file = write_config("[validtor]\nmode = \"fail_fast\"\n");
        let err = load_options(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_options(dir.path().join("absent.toml")).unwrap_err();
        match err {
            ConfigError::ConfigReadError { config_path, .. } => {
                assert!(config_path.ends_with("absent.toml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
