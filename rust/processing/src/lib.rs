// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load orchestration around the fragment converter: producer traits, the
//! concurrent load pipeline, background load jobs, the model registry and the
//! JSON interchange document used by the CLI.

pub mod config;
pub mod error;
pub mod json;
pub mod pipeline;
pub mod producer;
pub mod registry;
pub mod summary;

pub use config::LoaderConfig;
pub use error::{LoadError, Result};
pub use json::{JsonDocument, JsonGeometryReader, JsonMetadataReader};
pub use pipeline::{LoadJob, LoadPipeline};
pub use producer::{GeometryReader, MetadataReader, ProducerFailure};
pub use registry::{ModelHandle, ModelRegistry};
pub use summary::{BoundsSummary, ModelSummary};
