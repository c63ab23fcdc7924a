use matcherfix_canonical::{CanonicalizationError, ValidationError};
use matcherfix_container::ContainerError;
use matcherfix_core::EquivalenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a command with exit code 1.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Container {
        path: PathBuf,
        source: ContainerError,
    },
    #[error("invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },
    #[error("invalid user: {0}")]
    InvalidUser(#[from] ValidationError),
    #[error("failed to canonicalize configuration: {0}")]
    Canonicalize(#[from] CanonicalizationError),
    #[error("failed to compare configurations: {0}")]
    Equivalence(#[from] EquivalenceError),
    #[error("failed to fix configuration for user {user:?}: {source}")]
    Fix {
        user: String,
        source: CanonicalizationError,
    },
    #[error("failed to check if before and after are equal for user {user:?}: {source}")]
    Compare {
        user: String,
        source: EquivalenceError,
    },
    #[error("failed to read standard input: {0}")]
    Stdin(std::io::Error),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration for user {user:?} changed meaning after canonicalization")]
    Mismatch { user: String },
    #[error("an output file or --store directory is required")]
    MissingTarget,
    #[error("configurations differ in {count} place(s)")]
    NotEquivalent { count: usize },
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CliError::Io { path, source }
    }

    pub fn container(path: impl Into<PathBuf>) -> impl FnOnce(ContainerError) -> Self {
        let path = path.into();
        move |source| CliError::Container { path, source }
    }
}
