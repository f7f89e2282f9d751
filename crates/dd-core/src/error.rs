//! Error types for digesting a raw design response.

use thiserror::Error;

/// Everything that can go wrong in `dd-core`.
///
/// Only the first two variants come out of a build. Missing, `null` or
/// wrongly-typed optional fields on a node are never errors; they are
/// treated as absent.
#[derive(Error, Debug)]
pub enum DigestError {
    /// The input is not JSON, or its tree structure is broken: a node
    /// without `id`, `name` or `type`, or `children` that are not nodes.
    #[error("malformed design response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON, but neither a file response nor a node-set response.
    #[error("unrecognized design response: expected a `document` or `nodes` field")]
    UnrecognizedResponse,

    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to render JSON: {0}")]
    Json(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
