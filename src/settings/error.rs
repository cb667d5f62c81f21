//! Error types for settings persistence.

use std::io;
use thiserror::Error;

/// Settings persistence error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform config directory could not be determined.
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    /// Failed to create the settings directory.
    #[error("Failed to create directory: {0}")]
    DirectoryCreation(#[source] io::Error),

    /// Failed to read the settings file.
    #[error("Failed to read settings file: {0}")]
    Read(#[source] io::Error),

    /// Failed to write the settings file.
    #[error("Failed to write settings file: {0}")]
    Write(#[source] io::Error),

    /// The settings file is not a JSON object.
    #[error("Failed to parse settings file: {0}")]
    Parse(#[source] serde_json::Error),

    /// Failed to serialize settings.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_dir_not_found() {
        let err = SettingsError::ConfigDirNotFound;
        assert!(err.to_string().contains("config directory"));
    }

    #[test]
    fn test_error_display_write() {
        let err = SettingsError::Write(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(err.to_string().contains("write"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_source_is_preserved() {
        use std::error::Error as _;
        let err = SettingsError::Read(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(err.source().is_some());
    }
}
