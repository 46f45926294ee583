use thiserror::Error;

#[derive(Error, Debug)]
pub enum HallError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Override file '{path}' could not be used: {message}")]
    OverrideFileError { path: String, message: String },

    #[error("Source '{source_name}' could not be read: {message}")]
    SourceError {
        source_name: String,
        message: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Network,
    Configuration,
    Data,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HallError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HallError::IoError(_) | HallError::ZipError(_) => ErrorCategory::Io,
            HallError::HttpError(_) | HallError::SourceError { .. } => ErrorCategory::Network,
            HallError::RegexError(_)
            | HallError::ConfigError { .. }
            | HallError::ConfigValidationError { .. }
            | HallError::InvalidConfigValueError { .. }
            | HallError::MissingConfigError { .. } => ErrorCategory::Configuration,
            HallError::CsvError(_)
            | HallError::SerializationError(_)
            | HallError::OverrideFileError { .. } => ErrorCategory::Data,
            HallError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the directory is still produced from pre-override data
            HallError::OverrideFileError { .. } => ErrorSeverity::Low,
            HallError::HttpError(_) | HallError::SourceError { .. } => ErrorSeverity::Medium,
            HallError::CsvError(_)
            | HallError::SerializationError(_)
            | HallError::ProcessingError { .. } => ErrorSeverity::High,
            HallError::RegexError(_)
            | HallError::ConfigError { .. }
            | HallError::ConfigValidationError { .. }
            | HallError::InvalidConfigValueError { .. }
            | HallError::MissingConfigError { .. } => ErrorSeverity::High,
            HallError::IoError(_) | HallError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the output directory exists and is writable",
            ErrorCategory::Network => {
                "Check the halls URL and your network connection, or point --halls at a saved HTML file"
            }
            ErrorCategory::Configuration => {
                "Check the configuration file; every pattern must be a valid regular expression"
            }
            ErrorCategory::Data => {
                "Check the schedule and override files for malformed rows or invalid JSON"
            }
            ErrorCategory::Processing => "Re-run with --verbose to see which step failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HallError::MissingConfigError { field } => {
                format!("The setting '{}' is required but was not provided", field)
            }
            HallError::InvalidConfigValueError { field, reason, .. } => {
                format!("The setting '{}' is invalid: {}", field, reason)
            }
            HallError::SourceError { source_name, .. } => {
                format!("Could not read '{}'", source_name)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HallError>;
