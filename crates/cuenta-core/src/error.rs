//! Error types for Cuenta

use thiserror::Error;

use crate::validate::Violation;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Edit batch rejected: {} invalid edit(s)", .0.len())]
    EditsRejected(Vec<Violation>),
}

pub type Result<T> = std::result::Result<T, Error>;
