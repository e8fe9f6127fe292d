use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read workbook: {0}")]
    Read(String),

    #[error("Failed to write workbook: {0}")]
    Write(String),

    #[error("Invalid run month '{0}': expected YYYYMM")]
    InvalidRunMonth(String),

    #[error("Tag expression '{0}' has a DPD of 0")]
    ZeroDpd(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
