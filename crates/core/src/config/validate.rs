use super::{types::PipelineConfig, ConfigError};

/// Validate configuration
/// Currently validates:
/// - APDB URL uses a supported scheme
/// - Repository root is not empty
/// - Per-stage thresholds and radii are positive, finite numbers
/// - Forced photometry has at least one measurement enabled
pub fn validate_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    // APDB validation. Only the scheme is checked here; whether the database
    // behind the URL exists is a connect-time concern of the association
    // stage.
    if !config.apdb.url.starts_with("sqlite://") {
        return Err(ConfigError::ValidationError(format!(
            "apdb.url must use the sqlite:// scheme, got {:?}",
            config.apdb.url
        )));
    }

    // Repository validation
    if config.repository.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "repository.root cannot be empty".to_string(),
        ));
    }

    // Differencing validation
    if !config.differencing.detection_threshold.is_finite()
        || config.differencing.detection_threshold <= 0.0
    {
        return Err(ConfigError::ValidationError(format!(
            "differencing.detection_threshold must be positive, got {}",
            config.differencing.detection_threshold
        )));
    }

    // Association validation
    if !config.association.match_radius_arcsec.is_finite()
        || config.association.match_radius_arcsec <= 0.0
    {
        return Err(ConfigError::ValidationError(format!(
            "association.match_radius_arcsec must be positive, got {}",
            config.association.match_radius_arcsec
        )));
    }

    // Forced photometry validation
    if !config.forced_photometry.psf_flux && !config.forced_photometry.aperture_flux {
        return Err(ConfigError::ValidationError(
            "forced_photometry must enable at least one of psf_flux, aperture_flux".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = PipelineConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bad_apdb_scheme_fails() {
        let mut config = PipelineConfig::default();
        config.apdb.url = "postgresql://localhost/apdb".to_string();

        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_repository_root_fails() {
        let mut config = PipelineConfig::default();
        config.repository.root = std::path::PathBuf::new();

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_nonpositive_threshold_fails() {
        let mut config = PipelineConfig::default();
        config.differencing.detection_threshold = 0.0;
        assert!(validate_config(&config).is_err());

        config.differencing.detection_threshold = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_nonpositive_match_radius_fails() {
        let mut config = PipelineConfig::default();
        config.association.match_radius_arcsec = -1.0;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_no_measurements_fails() {
        let mut config = PipelineConfig::default();
        config.forced_photometry.psf_flux = false;
        config.forced_photometry.aperture_flux = false;

        assert!(validate_config(&config).is_err());
    }
}
