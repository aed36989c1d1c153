use crate::database::error::DatabaseError::UnderlyingDatabase;
use std::error::Error;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum DatabaseError {
    #[error("The connection to the database failed.")]
    ConnectionFailed,
    #[error("An error occurred within the database [reason: {0}].")]
    UnderlyingDatabase(String),
}

impl From<Box<dyn Error + Send + Sync + 'static>> for DatabaseError {
    fn from(value: Box<dyn Error + Send + Sync + 'static>) -> Self {
        UnderlyingDatabase(value.to_string())
    }
}

impl From<diesel::result::Error> for DatabaseError {
    fn from(value: diesel::result::Error) -> Self {
        UnderlyingDatabase(value.to_string())
    }
}

/// A member record that can't be used as is.
/// Only this member is affected: others can still be processed.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum MemberError {
    #[error("Member has a malformed {field} [id: {id}, value: {value}].")]
    MalformedDate {
        id: i32,
        field: &'static str,
        value: String,
    },
}
