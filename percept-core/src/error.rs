pub type PerceptResult<T> = Result<T, PerceptError>;

#[derive(thiserror::Error, Debug)]
pub enum PerceptError {
    #[error("surface error: {0}")]
    Surface(String),

    #[error("parameter error: {0}")]
    Params(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PerceptError {
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn params(msg: impl Into<String>) -> Self {
        Self::Params(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
