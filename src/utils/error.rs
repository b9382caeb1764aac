use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid field '{field}': {reason}")]
    FieldValidationError { field: String, reason: String },

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Session expired and the token could not be refreshed")]
    SessionExpired,

    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Conflict: {message}")]
    ConflictError { message: String },

    #[error("Not found: {message}")]
    NotFoundError { message: String },

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Unknown resource: {name}")]
    UnknownResource { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Validation,
    Configuration,
    Api,
    Storage,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdminError {
    /// 依 HTTP 狀態碼建立對應錯誤
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => AdminError::NotFoundError { message },
            409 => AdminError::ConflictError { message },
            _ => AdminError::ApiError { status, message },
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::ValidationError {
            message: message.into(),
        }
    }

    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AdminError::FieldValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by this error, if it came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::ApiError { status, .. } => Some(*status),
            AdminError::ConflictError { .. } => Some(409),
            AdminError::NotFoundError { .. } => Some(404),
            AdminError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::HttpError(_) => ErrorCategory::Network,
            AdminError::IoError(_) => ErrorCategory::Storage,
            AdminError::SerializationError(_) => ErrorCategory::Api,
            AdminError::CsvError(_) => ErrorCategory::Output,
            AdminError::ConfigError { .. }
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AdminError::ValidationError { .. }
            | AdminError::FieldValidationError { .. }
            | AdminError::UnknownResource { .. } => ErrorCategory::Validation,
            AdminError::Unauthenticated
            | AdminError::SessionExpired
            | AdminError::InvalidCredentials => ErrorCategory::Authentication,
            AdminError::ApiError { status: 401, .. } => ErrorCategory::Authentication,
            AdminError::ConflictError { .. }
            | AdminError::NotFoundError { .. }
            | AdminError::ApiError { .. } => ErrorCategory::Api,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdminError::HttpError(_) => ErrorSeverity::Medium,
            AdminError::ApiError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            AdminError::IoError(_)
            | AdminError::ConfigError { .. }
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::MissingConfigError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AdminError::HttpError(_) => {
                "Check network connectivity and the API base URL, then retry".to_string()
            }
            AdminError::IoError(_) => {
                "Check that the state directory exists and is writable".to_string()
            }
            AdminError::SerializationError(_) => {
                "The API returned an unexpected payload; verify the base URL points at the admin API"
                    .to_string()
            }
            AdminError::CsvError(_) => "Retry with --format table or --format json".to_string(),
            AdminError::ConfigError { .. }
            | AdminError::InvalidConfigValueError { .. }
            | AdminError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line flags".to_string()
            }
            AdminError::ValidationError { .. } | AdminError::FieldValidationError { .. } => {
                "Correct the highlighted field and submit again".to_string()
            }
            AdminError::UnknownResource { .. } => {
                "Run `tour-admin resources` to see the available resources".to_string()
            }
            AdminError::Unauthenticated | AdminError::SessionExpired => {
                "Run `tour-admin login` to start a new session".to_string()
            }
            AdminError::InvalidCredentials => "Check the login and password".to_string(),
            AdminError::ConflictError { .. } => {
                "A record with the same name already exists; choose another name".to_string()
            }
            AdminError::NotFoundError { .. } => {
                "The record may have been deleted; list the resource again".to_string()
            }
            AdminError::ApiError { status, .. } if *status >= 500 => {
                "The server failed to process the request; retry later".to_string()
            }
            AdminError::ApiError { .. } => "Review the submitted values".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::HttpError(_) => "Could not reach the admin API".to_string(),
            AdminError::Unauthenticated => "You are not logged in".to_string(),
            AdminError::SessionExpired => "Your session has expired".to_string(),
            AdminError::FieldValidationError { field, reason } => format!("{}: {}", field, reason),
            AdminError::ValidationError { message } => message.clone(),
            AdminError::ConflictError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
