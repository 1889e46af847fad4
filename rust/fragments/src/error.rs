// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for fragment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading fragment inputs and labels
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid shape key '{0}': expected '+<id>' or '-<id>'")]
    InvalidShapeKey(String),

    #[error("Invalid item label '{0}'")]
    InvalidLabel(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] ifc_fragments_geometry::Error),
}

impl Error {
    /// True when the error only means there is nothing to render
    pub fn is_empty_mesh(&self) -> bool {
        matches!(self, Error::Geometry(err) if err.is_empty_mesh())
    }
}
