/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid display name: {0}")]
    InvalidDisplayName(String),

    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("configuration error: {0}")]
    Config(String),
}
