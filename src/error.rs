use crate::config::error::ConfigurationError;
use crate::database::error::DatabaseError;
use crate::notification::error::SweepError;
use crate::web::error::WebError;
use thiserror::Error;

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("The configuration is invalid.")]
    Configuration(#[from] ConfigurationError),
    #[error("An error has occurred with the database.")]
    Database(#[from] DatabaseError),
    #[error("An error has been encountered while executing requests onto another server.")]
    Web(#[from] WebError),
    #[error("The notification sweep failed.")]
    Sweep(#[from] SweepError),
}
