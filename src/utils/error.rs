use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReframeError {
    #[error("Resource unavailable: {resource} ({reason})")]
    ResourceUnavailable { resource: String, reason: String },

    #[error("Local conversion failed: {message}")]
    ConversionError { message: String },

    #[error("REST service error at {endpoint}: {message}")]
    ServiceError { endpoint: String, message: String },

    #[error("Cannot tell whether ({x}, {y}) is LV03 or WGS84")]
    AmbiguousDirection { x: f64, y: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ReframeError {
    /// Name of the stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            ReframeError::ResourceUnavailable { .. } => "grid",
            ReframeError::ConversionError { .. } => "local",
            ReframeError::ServiceError { .. } => "rest",
            ReframeError::AmbiguousDirection { .. } => "direction",
            ReframeError::IoError(_) | ReframeError::CsvError(_) => "io",
            ReframeError::ConfigValidationError { .. }
            | ReframeError::InvalidConfigValueError { .. } => "config",
        }
    }

    pub fn is_config_error(&self) -> bool {
        self.stage() == "config"
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReframeError::ResourceUnavailable { resource, .. } => {
                format!("Could not obtain {}", resource)
            }
            ReframeError::ConversionError { .. } => {
                "The local PROJ conversion failed".to_string()
            }
            ReframeError::ServiceError { .. } => {
                "The swisstopo conversion service did not answer correctly".to_string()
            }
            ReframeError::AmbiguousDirection { x, y } => format!(
                "Point ({}, {}) is neither clearly LV03 nor clearly WGS84",
                x, y
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReframeError::ResourceUnavailable { .. } => {
                "Download chenyx06etrs.gsb manually and put it in grid.local_dir or a PROJ_LIB directory"
            }
            ReframeError::ConversionError { .. } => {
                "Check that the grid file is a valid NTv2 file and the point lies in Switzerland"
            }
            ReframeError::ServiceError { .. } => {
                "Check network access and rest.endpoint, or retry with --backend local"
            }
            ReframeError::AmbiguousDirection { .. } => {
                "Use LV03 metres (e.g. 600000,200000) or WGS84 degrees (e.g. 7.44,46.95)"
            }
            ReframeError::IoError(_) | ReframeError::CsvError(_) => {
                "Check that the input file exists and has x,y columns"
            }
            _ => "Fix the configuration file and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReframeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let err = ReframeError::ServiceError {
            endpoint: "https://example.com".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(err.stage(), "rest");
        assert!(err.to_string().contains("HTTP 503"));

        let err = ReframeError::AmbiguousDirection { x: 500.0, y: 10.0 };
        assert_eq!(err.stage(), "direction");

        let err = ReframeError::ConfigValidationError {
            field: "rest.endpoint".to_string(),
            message: "must not be empty".to_string(),
        };
        assert!(err.is_config_error());
    }

    #[test]
    fn test_underlying_message_preserved() {
        let err = ReframeError::ConversionError {
            message: "proj_create: grid not found".to_string(),
        };
        assert!(err.to_string().contains("grid not found"));
    }
}
