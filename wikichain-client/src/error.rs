use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("API error {code}: {info}")]
    ApiError { code: String, info: String },

    #[error("Continuation for {0} did not advance")]
    StalledContinuation(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
