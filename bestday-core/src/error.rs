use chrono::NaiveDate;

/// A collaborator (weather source, bias model or geocoder) could not deliver data.
///
/// The fusion engine and the geocoder never propagate this upward: it is logged
/// and the caller degrades to the next source or to a fixed fallback.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("no API key configured")]
    MissingApiKey,
}

/// Errors a planning run can return. Every other stage has a fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}
