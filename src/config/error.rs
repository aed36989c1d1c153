use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("The --database-url argument is missing.")]
    MissingDatabaseUrl,
    #[error("The daily run time should be formatted as HH:MM [value: {0}].")]
    InvalidRunAt(String),
    #[error("The trigger days should be a comma-separated list of signed integers [value: {0}].")]
    InvalidTriggerDays(String),
    #[error("The {arg} argument should be a boolean [value: {value}].")]
    InvalidBoolean { arg: String, value: String },
    #[error("The {arg} argument should be a positive number [value: {value}].")]
    InvalidNumber { arg: String, value: String },
    #[error("The maximum number of concurrent sends should be between 1 and {max} [value: {value}].")]
    InvalidMaxConcurrentSends { value: usize, max: usize },
    #[error("The country code should only contain digits [value: {0}].")]
    InvalidCountryCode(String),
}
