use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported year {0}: data is available for 2013-2020")]
    UnsupportedYear(u16),

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("top-n cutoff must be a positive number")]
    InvalidTopN,

    /// A raw source lacks every accepted name for a required column.
    #[error("dataset {dataset} has no column for '{column}'")]
    SchemaDrift { dataset: String, column: String },

    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn schema_drift(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        Error::SchemaDrift {
            dataset: dataset.into(),
            column: column.into(),
        }
    }
}
