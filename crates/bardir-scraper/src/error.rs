use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A detail page was fetched but a required labelled field is absent.
    #[error("detail page {url} has no \"{label}\" field")]
    MissingField { url: String, label: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A member's detail page answered with a 4xx status, e.g. a stale link.
    #[error("detail page {url} unavailable (HTTP {status})")]
    DetailUnavailable { url: String, status: u16 },
}

impl ScraperError {
    /// `true` for failures of the network exchange itself, including
    /// throttling and server-side errors that survived every retry.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            ScraperError::Http(_) | ScraperError::RateLimited { .. } => true,
            ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
            ScraperError::MissingField { .. }
            | ScraperError::InvalidUrl { .. }
            | ScraperError::DetailUnavailable { .. } => false,
        }
    }

    /// `true` when only the record being enriched is affected; the run can
    /// move on to the next record.
    #[must_use]
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            ScraperError::MissingField { .. }
                | ScraperError::InvalidUrl { .. }
                | ScraperError::DetailUnavailable { .. }
        )
    }
}
