use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot read {path}: {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Complaint keyword table has no categories")]
    EmptyCategoryTable,

    #[error("Complaint category '{name}' is declared more than once")]
    DuplicateCategory { name: String },

    #[error("Complaint category '{name}' has no keywords")]
    EmptyKeywordList { name: String },

    #[error("Complaint category '{name}' contains a blank keyword")]
    BlankKeyword { name: String },

    #[error("Complaint category '{name}' keyword '{keyword}' has uppercase letters and can never match")]
    UppercaseKeyword { name: String, keyword: String },

    #[error("Fallback label '{label}' is invalid: {reason}")]
    InvalidFallback { label: String, reason: String },

    #[error("Negative review threshold {0} is outside 1..=5")]
    InvalidThreshold(u8),

    #[error("Lateness bin edges must be non-empty, finite and strictly increasing: {edges:?}")]
    InvalidBinEdges { edges: Vec<f64> },
}

pub type InsightResult<T> = Result<T, InsightError>;
