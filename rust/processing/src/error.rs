// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model loading.

use thiserror::Error;

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Reasons a load produced no model
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Geometry producer failed: {0}")]
    GeometryUnavailable(String),

    #[error("Metadata producer failed: {0}")]
    MetadataUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl LoadError {
    /// True when an upstream producer flagged the failure
    pub fn is_producer_failure(&self) -> bool {
        matches!(
            self,
            LoadError::GeometryUnavailable(_) | LoadError::MetadataUnavailable(_)
        )
    }
}
