//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_language("file_name_language", &config.options.file_name_language)?;
    validate_language("captions.language", &config.captions.language)?;

    if config.captions.fps == 0 {
        return Err(Error::ConfigValidation {
            field: "captions.fps".to_string(),
            message: "Frame rate must be greater than zero".to_string(),
        });
    }

    if config.network.connect_timeout_seconds == 0 {
        return Err(Error::ConfigValidation {
            field: "network.connect_timeout_seconds".to_string(),
            message: "Connect timeout must be greater than zero".to_string(),
        });
    }

    if config.network.user_agent.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "network.user_agent".to_string(),
            message: "User agent cannot be empty".to_string(),
        });
    }

    Ok(())
}

/// Validate a language code.
pub fn validate_language(field: &str, language: &str) -> Result<()> {
    if language.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Language code cannot be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_fps() {
        let mut config = Config::default();
        config.captions.fps = 0;
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { field, .. }) if field == "captions.fps"
        ));
    }

    #[test]
    fn test_empty_language() {
        let mut config = Config::default();
        config.options.file_name_language = " ".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.network.connect_timeout_seconds = 0;
        assert!(validate_config(&config).is_err());
    }
}
