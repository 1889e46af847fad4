// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Upstream producers of converter inputs
//!
//! Both producers decode the same raw file bytes independently. Either may
//! report failure instead of a payload, in which case the load stops before
//! conversion.

use ifc_fragments::{ElementMetadata, ParsedGeometrySet};
use std::fmt;

/// Error flag raised by a producer
///
/// Carries no payload; the optional reason is only used for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerFailure {
    pub reason: Option<String>,
}

impl ProducerFailure {
    pub fn flagged() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for ProducerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => f.write_str(reason),
            None => f.write_str("producer reported an error"),
        }
    }
}

impl std::error::Error for ProducerFailure {}

/// Decodes a model file into the geometry table
pub trait GeometryReader: Send + Sync {
    fn read_geometry(&self, data: &[u8]) -> Result<ParsedGeometrySet, ProducerFailure>;
}

/// Decodes a model file into floor/category metadata
pub trait MetadataReader: Send + Sync {
    fn read_metadata(&self, data: &[u8]) -> Result<ElementMetadata, ProducerFailure>;
}

impl<T: GeometryReader + ?Sized> GeometryReader for std::sync::Arc<T> {
    fn read_geometry(&self, data: &[u8]) -> Result<ParsedGeometrySet, ProducerFailure> {
        (**self).read_geometry(data)
    }
}

impl<T: MetadataReader + ?Sized> MetadataReader for std::sync::Arc<T> {
    fn read_metadata(&self, data: &[u8]) -> Result<ElementMetadata, ProducerFailure> {
        (**self).read_metadata(data)
    }
}
