use crate::database::error::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SweepError {
    #[error("The member snapshot can't be read.")]
    StoreUnavailable(#[source] DatabaseError),
    #[error("Another sweep is still running.")]
    AlreadyRunning,
}
