use thiserror::Error;

/// Failure reaching or decoding the upstream league data source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("error decoding response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

/// Failure producing a report. Renders as `error fetching <what>: <cause>`.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("error fetching {what}: {source}")]
    Source {
        what: &'static str,
        #[source]
        source: SourceError,
    },
}

impl ReportError {
    pub fn fetching(what: &'static str, source: SourceError) -> Self {
        ReportError::Source { what, source }
    }
}
