use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WebError {
    #[error("Client couldn't be created.")]
    CantCreateClient,
    #[error("The connection to the other server failed [reason: {0}].")]
    ConnectionFailed(String),
    #[error("The other server didn't answer in time.")]
    Timeout,
    #[error("The other server answered with an unexpected status [status: {status}, body: {body}].")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<reqwest::Error> for WebError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WebError::Timeout
        } else {
            WebError::ConnectionFailed(error.to_string())
        }
    }
}
