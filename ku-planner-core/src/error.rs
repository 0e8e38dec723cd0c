use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Course data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Malformed course data: {0}")]
    MalformedData(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid time '{0}', expected HH:MM or HH:MM-HH:MM")]
    InvalidTime(String),

    #[error("Unknown day code: {0}")]
    UnknownDay(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error came from reading or decoding the catalog
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::DataSourceUnavailable(_) | Self::MalformedData(_) | Self::Http(_)
        )
    }

    /// Whether the error is a rejected user input
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidTime(_) | Self::UnknownDay(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
