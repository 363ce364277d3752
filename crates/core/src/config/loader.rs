use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::PipelineConfig, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: PipelineConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("DIAPIPE_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<PipelineConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IsolationLevel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[apdb]
url = "sqlite://"
isolation_level = "READ_UNCOMMITTED"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.apdb.url, "sqlite://");
        assert_eq!(config.apdb.isolation_level, IsolationLevel::ReadUncommitted);
    }

    #[test]
    fn test_load_config_from_str_invalid_section_value() {
        let toml = r#"
[differencing]
template = "median_stack"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[repository]
root = "/data/repo"

[association]
match_radius_arcsec = 2.0
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.repository.root.to_string_lossy(), "/data/repo");
        assert_eq!(config.association.match_radius_arcsec, 2.0);
    }
}
