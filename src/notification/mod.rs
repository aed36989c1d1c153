pub mod classification;
pub mod error;
pub mod notifier;
pub mod phone;
pub mod summary;
pub mod sweep;
