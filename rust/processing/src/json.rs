// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON interchange document
//!
//! A pre-parsed model stored as `{ "geometries": ..., "metadata": ... }`. The
//! two readers decode their own half of the same bytes, so the document can
//! stand in for the native producers.

use crate::error::Result;
use crate::producer::{GeometryReader, MetadataReader, ProducerFailure};
use ifc_fragments::{ElementMetadata, ParsedGeometrySet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDocument {
    pub geometries: ParsedGeometrySet,
    #[serde(default)]
    pub metadata: ElementMetadata,
}

impl JsonDocument {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[derive(Deserialize)]
struct GeometryHalf {
    geometries: ParsedGeometrySet,
}

#[derive(Deserialize)]
struct MetadataHalf {
    #[serde(default)]
    metadata: ElementMetadata,
}

/// Reads `geometries` from a [`JsonDocument`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGeometryReader;

impl GeometryReader for JsonGeometryReader {
    fn read_geometry(&self, data: &[u8]) -> std::result::Result<ParsedGeometrySet, ProducerFailure> {
        serde_json::from_slice::<GeometryHalf>(data)
            .map(|half| half.geometries)
            .map_err(|err| ProducerFailure::with_reason(format!("invalid geometry document: {}", err)))
    }
}

/// Reads `metadata` from a [`JsonDocument`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMetadataReader;

impl MetadataReader for JsonMetadataReader {
    fn read_metadata(&self, data: &[u8]) -> std::result::Result<ElementMetadata, ProducerFailure> {
        serde_json::from_slice::<MetadataHalf>(data)
            .map(|half| half.metadata)
            .map_err(|err| ProducerFailure::with_reason(format!("invalid metadata document: {}", err)))
    }
}
