use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("File path for {dataset} is missing or invalid: '{path}'")]
    PathError { dataset: String, path: String },

    #[error("Failed to load '{path}': {reason}")]
    LoadError { path: String, reason: String },

    #[error("{context}: missing column(s) {}", missing.join(", "))]
    SchemaError {
        context: String,
        missing: Vec<String>,
    },

    #[error("Invalid period '{value}'")]
    InvalidPeriod { value: String },

    #[error("Dataset '{name}' is not available or is empty")]
    DatasetUnavailable { name: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Schema,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn schema(context: impl Into<String>, missing: &[&str]) -> Self {
        DashboardError::SchemaError {
            context: context.into(),
            missing: missing.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::PathError { .. }
            | DashboardError::ConfigError { .. }
            | DashboardError::ConfigValidationError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::InvalidPeriod { .. } => ErrorCategory::Configuration,
            DashboardError::LoadError { .. }
            | DashboardError::CsvError(_)
            | DashboardError::DatasetUnavailable { .. } => ErrorCategory::Input,
            DashboardError::SchemaError { .. } => ErrorCategory::Schema,
            DashboardError::ZipError(_)
            | DashboardError::IoError(_)
            | DashboardError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DashboardError::DatasetUnavailable { .. } => ErrorSeverity::Medium,
            DashboardError::IoError(_) | DashboardError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::PathError { dataset, path } => {
                format!("File for {} not found: {}", dataset, path)
            }
            DashboardError::LoadError { path, reason } => {
                format!("Could not read '{}': {}", path, reason)
            }
            DashboardError::SchemaError { context, missing } => {
                format!("{} needs column(s): {}", context, missing.join(", "))
            }
            DashboardError::InvalidPeriod { value } => format!(
                "Unknown period '{}'. Use one of: Ano, Semestre, Trimestre, Mês, Semana, Dia da Semana, Data",
                value
            ),
            DashboardError::DatasetUnavailable { name } => {
                format!("The dataset '{}' is not available or is empty", name)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check --sales/--catalog or the [paths] section of the config file"
            }
            ErrorCategory::Input => {
                "Make sure the file is ';'-delimited UTF-8 text with a header row"
            }
            ErrorCategory::Schema => "Check the header row of the input file for the listed columns",
            ErrorCategory::Output => "Check that the output directory is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
