use thiserror::Error;

/// Why a post was not accepted by the publishing service.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The service answered, but refused the post.
    #[error("rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The request never got a usable answer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PublishError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }
}
