use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response status: {0}")]
    ResponseStatus(StatusCode),

    ///
    /// Response arrived after the session it was requested for
    /// had been replaced.
    ///
    #[error("stale response discarded")]
    StaleResponse,

    #[error("invalid session token: {0}")]
    InvalidSessionToken(#[from] jwt_auth::error::Error),
}
