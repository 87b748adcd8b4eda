use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeatError {
    #[error("Unparsable document from '{source_name}': {reason}")]
    UnparsableDocument { source_name: String, reason: String },

    #[error("Transport error fetching {url}: {message}")]
    TransportError { url: String, message: String },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Extraction,
    Network,
    Storage,
    Rendering,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HeatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HeatError::UnparsableDocument { .. } => ErrorCategory::Extraction,
            HeatError::TransportError { .. } | HeatError::HttpError(_) => ErrorCategory::Network,
            HeatError::IoError(_) | HeatError::SerializationError(_) => ErrorCategory::Storage,
            HeatError::TemplateError(_) | HeatError::RenderError(_) => ErrorCategory::Rendering,
            HeatError::ConfigValidationError { .. }
            | HeatError::InvalidConfigValueError { .. }
            | HeatError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單一來源失敗只會縮小本期名單
            ErrorCategory::Extraction => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Rendering | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HeatError::UnparsableDocument { source_name, .. } => {
                format!("Could not read the page from {}", source_name)
            }
            HeatError::TransportError { url, .. } => format!("Could not download {}", url),
            HeatError::HttpError(_) => "A network request failed".to_string(),
            HeatError::IoError(e) => format!("File operation failed: {}", e),
            HeatError::SerializationError(_) => "Could not serialize the issue".to_string(),
            HeatError::TemplateError(_) | HeatError::RenderError(_) => {
                "Could not render the HTML issue".to_string()
            }
            HeatError::ConfigValidationError { field, .. }
            | HeatError::InvalidConfigValueError { field, .. }
            | HeatError::MissingConfigError { field } => {
                format!("Configuration problem with '{}'", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Extraction => {
                "The source layout may have changed; review its extraction rule"
            }
            ErrorCategory::Network => "Check connectivity and retry the run later",
            ErrorCategory::Storage => "Check that the output path exists and is writable",
            ErrorCategory::Rendering => "Check the issue template for syntax errors",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, HeatError>;
