pub type ShortsResult<T> = Result<T, ShortsError>;

/// Failure kinds surfaced by the renderer and the HTTP layer.
///
/// `Validation` is the only client-caused kind; everything else is a server-side failure.
#[derive(thiserror::Error, Debug)]
pub enum ShortsError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error("composition error: {0}")]
    Composition(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShortsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// `true` for errors caused by the request shape rather than by the service.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
