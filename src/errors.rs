use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unsupported update operator: {0}")]
    UnsupportedUpdateOperator(String),

    #[error("Unsupported BSON type value: {0}")]
    UnsupportedBsonType(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
