use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Spreadsheet read failed: {0}")]
    SpreadsheetError(#[from] calamine::XlsxError),

    #[error("Spreadsheet export failed: {0}")]
    ExportError(#[from] rust_xlsxwriter::XlsxError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("WebDriver command failed: {message}")]
    WebDriverError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl ResolverError {
    pub fn webdriver(message: impl Into<String>) -> Self {
        Self::WebDriverError {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
