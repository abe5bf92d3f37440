use std::path::PathBuf;

use thiserror::Error;

/// Failures the deploy pipeline reports to the user before exiting non-zero.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("no crawl project found in this location")]
    NotInProject,

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("missing project (use -p or set 'project' in the target section)")]
    MissingProject,

    #[error("missing url for target '{0}'")]
    MissingUrl(String),

    #[error("missing requirements.txt")]
    MissingRequirements,

    #[error("egg build failed ({0})")]
    BuildFailed(String),

    #[error("no egg produced in {}", .0.display())]
    NoEggProduced(PathBuf),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("server returned an error: {0}")]
    ErrorResponse(String),
}
