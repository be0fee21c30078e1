use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefenseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Presentation {0} not found")]
    PresentationNotFound(i64),

    #[error("Student {0} not found")]
    StudentNotFound(i64),

    #[error("Professor {0} not found")]
    ProfessorNotFound(i64),

    #[error("Committee of '{student}' is invalid: {message}")]
    CommitteeInvariant { student: String, message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    NotFound,
    Data,
    Storage,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DefenseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::PresentationNotFound(_)
            | Self::StudentNotFound(_)
            | Self::ProfessorNotFound(_) => ErrorCategory::NotFound,
            Self::CommitteeInvariant { .. } | Self::SerializationError(_) => ErrorCategory::Data,
            Self::StorageError { .. } => ErrorCategory::Storage,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the TOML configuration file and the referenced environment variables",
            ErrorCategory::NotFound => "List the stored presentations and retry with existing identifiers",
            ErrorCategory::Data => "Inspect the store file for malformed or inconsistent committee data",
            ErrorCategory::Storage => "No changes were applied; retry the whole run once the store is writable",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::PresentationNotFound(id) => format!("There is no presentation with id {}", id),
            Self::StorageError { .. } => {
                "The store could not be updated; the operation was rolled back".to_string()
            }
            Self::CommitteeInvariant { student, message } => {
                format!("The committee of {} cannot be saved: {}", student, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DefenseError>;
