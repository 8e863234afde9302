use thiserror::Error;

/// Failure of the underlying page fetch.
///
/// The caching layer treats every variant the same way: the failure is logged
/// and the caller receives an empty page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not read body from {url}: {reason}")]
    Body { url: String, reason: String },
}

impl FetchFailure {
    pub fn request(url: impl Into<String>, reason: impl ToString) -> Self {
        FetchFailure::Request {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
