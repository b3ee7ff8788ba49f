use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/**
 * Everything that can go wrong while generating cells or relations. Parse
 * problems are recoverable (the offending feature is skipped); the rest
 * abort the work unit they occur in.
 */
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("geometry of type {0} not supported for s2 relations")]
    UnsupportedGeometry(String),

    #[error("invalid cell level: {0}")]
    InvalidLevel(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("malformed geometry input: {0}")]
    Parse(String),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
