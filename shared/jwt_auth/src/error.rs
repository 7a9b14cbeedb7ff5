#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}
