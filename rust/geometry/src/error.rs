// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building render buffers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Vertex data length {0} is not a multiple of 6 (position + normal)")]
    MisalignedVertexData(usize),

    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),
}

impl Error {
    /// Whether this error only means "nothing to render"
    #[inline]
    pub fn is_empty_mesh(&self) -> bool {
        matches!(self, Error::EmptyMesh(_))
    }
}
