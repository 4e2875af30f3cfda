//! Error types for sparsevox

use thiserror::Error;

/// Main error type for the crate
///
/// Octree construction and flattening never fail on valid input; errors only
/// surface at the configuration and GPU upload boundaries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GPU error: {0}")]
    Gpu(String),

    /// Worker pool could not be configured (`--jobs` in the CLI)
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
