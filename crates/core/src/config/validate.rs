use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Engine app folder is set and the event buffer is non-zero
/// - The deletion registry can hold at least one entry
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.engine.app_folder.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.app_folder cannot be empty".to_string(),
        ));
    }

    if config.engine.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "engine.event_buffer must be greater than 0".to_string(),
        ));
    }

    if config.files.max_pending_deletions == 0 {
        return Err(ConfigError::ValidationError(
            "files.max_pending_deletions must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
