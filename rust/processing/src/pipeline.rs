// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model load pipeline
//!
//! Raw file bytes go in; the geometry and metadata producers decode them
//! concurrently on the pipeline's thread pool, and once both have answered a
//! fresh converter turns them into a model. A producer failure ends the load
//! before any converter exists, so a failed load never yields partial results.

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::producer::{GeometryReader, MetadataReader};
use ifc_fragments::{FragmentConverter, FragmentModel};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

pub struct LoadPipeline<G, M> {
    geometry: G,
    metadata: M,
    pool: rayon::ThreadPool,
    conversions: AtomicUsize,
}

impl<G, M> LoadPipeline<G, M>
where
    G: GeometryReader,
    M: MetadataReader,
{
    pub fn new(geometry: G, metadata: M, config: &LoaderConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|index| format!("fragments-producer-{}", index))
            .build()
            .map_err(|err| LoadError::Worker(err.to_string()))?;

        tracing::debug!(worker_threads = config.worker_threads, "Load pipeline ready");
        Ok(Self {
            geometry,
            metadata,
            pool,
            conversions: AtomicUsize::new(0),
        })
    }

    /// Load one model from raw file bytes
    pub fn run(&self, data: &[u8]) -> Result<FragmentModel> {
        tracing::info!(content_size = data.len(), "Starting model load");
        let start = Instant::now();

        let (geometry, metadata) = self.pool.join(
            || self.geometry.read_geometry(data),
            || self.metadata.read_metadata(data),
        );
        let produce_time = start.elapsed();

        let geometry = geometry.map_err(|failure| {
            tracing::warn!(reason = %failure, "Geometry producer failed");
            LoadError::GeometryUnavailable(failure.to_string())
        })?;
        let metadata = metadata.map_err(|failure| {
            tracing::warn!(reason = %failure, "Metadata producer failed");
            LoadError::MetadataUnavailable(failure.to_string())
        })?;

        tracing::debug!(
            shapes = geometry.len(),
            instances = geometry.instance_count(),
            produce_time_ms = produce_time.as_millis() as u64,
            "Producers complete, starting conversion"
        );

        self.conversions.fetch_add(1, Ordering::Relaxed);
        let mut converter = FragmentConverter::new();
        let model = converter.generate(geometry, &metadata);
        converter.clean_up();

        tracing::info!(
            fragments = model.fragment_count(),
            elements = model.items().len(),
            produce_time_ms = produce_time.as_millis() as u64,
            total_time_ms = start.elapsed().as_millis() as u64,
            "Model load complete"
        );
        Ok(model)
    }

    /// Number of loads that got past both producers and reached the converter
    #[inline]
    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::Relaxed)
    }

    /// Load one model from a file on disk
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<FragmentModel> {
        let data = std::fs::read(path)?;
        self.run(&data)
    }
}

impl<G, M> LoadPipeline<G, M>
where
    G: GeometryReader + 'static,
    M: MetadataReader + 'static,
{
    /// Run a load on a background thread
    ///
    /// The job delivers exactly one result. Dropping it discards whatever the
    /// worker produces.
    pub fn spawn(self: Arc<Self>, data: Vec<u8>) -> Result<LoadJob> {
        let (sender, receiver) = mpsc::sync_channel(1);
        thread::Builder::new()
            .name("fragments-load".to_string())
            .spawn(move || {
                let result = self.run(&data);
                if sender.send(result).is_err() {
                    tracing::debug!("Load job dropped before completion, discarding result");
                }
            })?;
        Ok(LoadJob { receiver })
    }
}

/// Handle to a background load
#[derive(Debug)]
pub struct LoadJob {
    receiver: Receiver<Result<FragmentModel>>,
}

impl LoadJob {
    /// Block until the load finishes
    pub fn wait(self) -> Result<FragmentModel> {
        self.receiver
            .recv()
            .map_err(|_| LoadError::Worker("load worker exited without a result".to_string()))?
    }

    /// The result if the load has finished
    pub fn try_result(&self) -> Option<Result<FragmentModel>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Worker(
                "load worker exited without a result".to_string(),
            ))),
        }
    }
}
