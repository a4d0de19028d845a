//! Error types for cadencelib
//!
//! Defines the core error types used throughout cadencelib. The cadence
//! adapter itself tolerates misuse silently; errors here cover fallible
//! infrastructure such as queue construction and configuration loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("work queue error: {0}")]
    Queue(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type that uses CadenceError
pub type Result<T> = std::result::Result<T, CadenceError>;
