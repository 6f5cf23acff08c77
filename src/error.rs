//! Errors that abort a build.
use std::path::PathBuf;

use thiserror::Error;

use crate::transform::TransformError;

/// Result type for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unrecoverable build errors.
///
/// None of these are retried; a broken dependency graph cannot
/// produce a correct artifact.
#[derive(Debug, Error)]
pub enum Error {
    /// A source file is missing or unreadable.
    #[error("failed to read source file {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source transformer rejected a module.
    #[error("failed to transform {}: {source}", .path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    /// A specifier could not be mapped to an existing file.
    #[error(
        "cannot resolve module '{specifier}' from {} (tried {})",
        .base.display(),
        display_candidates(.tried)
    )]
    ModuleResolution {
        specifier: String,
        base: PathBuf,
        tried: Vec<PathBuf>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn display_candidates(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
