use thiserror::Error;

/// Everything that can go wrong while fetching, parsing or persisting a schedule.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// Transport failure, timeout or a non-success HTTP status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body is not JSON or lacks a required top-level field.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// The HTML fragment could not be parsed at all.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The remote clock could not be reached or answered with garbage.
    #[error("time source unavailable: {0}")]
    TimeSourceUnavailable(String),

    /// Days of the week whose fetch or extraction failed.
    #[error("schedule incomplete, failed dates: {}", failed_dates.join(", "))]
    PartialSchedule { failed_dates: Vec<String> },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimetableError {
    pub fn malformed(endpoint: &str, reason: impl ToString) -> Self {
        TimetableError::MalformedResponse {
            endpoint: endpoint.to_owned(),
            reason: reason.to_string(),
        }
    }
}
