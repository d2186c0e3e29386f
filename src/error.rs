use thiserror::Error;

/// Why a data-room run stopped. Every variant aborts the remaining statements.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("namespace `{0}` does not exist")]
    MissingNamespace(String),

    #[error("table `{0}` does not exist")]
    MissingTable(String),

    #[error("source table `{table}` is unavailable: {reason}")]
    MissingSource { table: String, reason: String },

    #[error("invalid data in `{table}`: {message}")]
    Data { table: String, message: String },

    #[error("text generation failed: {0}")]
    External(String),
}

impl LoadError {
    pub fn data(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            table: table.into(),
            message: message.into(),
        }
    }
}
