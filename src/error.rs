use chrono::NaiveDateTime;
use thiserror::Error;

/// Optimisation window does not strictly contain the observed departure days
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("debutOptim ({start}) must be earlier than the first departure day ({observed_min})")]
    StartNotBeforeWindow {
        start: NaiveDateTime,
        observed_min: NaiveDateTime,
    },
    #[error("finOptim ({end}) must be later than the last departure day ({observed_max})")]
    EndNotAfterWindow {
        end: NaiveDateTime,
        observed_max: NaiveDateTime,
    },
}

/// Shape or type mismatch found while walking a document against a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Missing key {path}")]
    MissingKey { path: String },
    #[error("{path} must be an object")]
    NotAnObject { path: String },
    #[error("{path} must be a list")]
    NotAList { path: String },
    #[error("{path} must be of type {expected}")]
    TypeMismatch { path: String, expected: String },
    #[error("{path} has invalid value")]
    InvalidValue { path: String },
}

impl SchemaError {
    /// Dotted path of the offending field
    pub fn path(&self) -> &str {
        match self {
            SchemaError::MissingKey { path }
            | SchemaError::NotAnObject { path }
            | SchemaError::NotAList { path }
            | SchemaError::TypeMismatch { path, .. }
            | SchemaError::InvalidValue { path } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid timestamp for {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid run parameters: {0}")]
    InvalidParams(String),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::InvalidParams(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
