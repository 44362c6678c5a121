use thiserror::Error;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Errors raised by the launch pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("schema error at row {row}: {message}")]
    Schema { row: usize, message: String },

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model has not been fitted yet")]
    ModelNotReady,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn schema(row: usize, message: impl Into<String>) -> Self {
        Self::Schema {
            row,
            message: message.into(),
        }
    }
}
