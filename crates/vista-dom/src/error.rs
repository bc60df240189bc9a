use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to read HTML file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

impl DomError {
    pub(crate) fn selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
