// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loaded models held by the host application

use crate::config::LoaderConfig;
use ifc_fragments::{rebase_on_host, FragmentModel, MapHost, RebaseOutcome};
use rustc_hash::FxHashMap;

/// Handle of a registered model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(u32);

#[derive(Debug, Default)]
pub struct ModelRegistry {
    next_handle: u32,
    order: Vec<ModelHandle>,
    models: FxHashMap<ModelHandle, FragmentModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, model: FragmentModel) -> ModelHandle {
        let handle = ModelHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(
            handle = handle.0,
            fragments = model.fragment_count(),
            "Registered model"
        );
        self.order.push(handle);
        self.models.insert(handle, model);
        handle
    }

    #[inline]
    pub fn get(&self, handle: ModelHandle) -> Option<&FragmentModel> {
        self.models.get(&handle)
    }

    pub fn remove(&mut self, handle: ModelHandle) -> Option<FragmentModel> {
        let model = self.models.remove(&handle)?;
        self.order.retain(|&h| h != handle);
        Some(model)
    }

    /// Models in registration order
    pub fn models(&self) -> impl Iterator<Item = (ModelHandle, &FragmentModel)> + '_ {
        self.order
            .iter()
            .filter_map(move |&handle| self.models.get(&handle).map(|model| (handle, model)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Rebase every model onto `host` at the configured anchor
    ///
    /// Does nothing when rebasing is disabled. Host failures skip the affected
    /// model and are reported in the outcomes; they never remove a model.
    pub fn rebase_all<H>(&mut self, host: &H, config: &LoaderConfig) -> Vec<(ModelHandle, RebaseOutcome)>
    where
        H: MapHost + ?Sized,
    {
        if !config.rebase_enabled {
            tracing::debug!("Geo-rebasing disabled");
            return Vec::new();
        }

        let rebase = config.rebase();
        let mut outcomes = Vec::with_capacity(self.order.len());
        for handle in &self.order {
            if let Some(model) = self.models.get_mut(handle) {
                outcomes.push((*handle, rebase_on_host(model, host, config.anchor(), &rebase)));
            }
        }
        outcomes
    }

    /// Drop every model
    pub fn dispose(&mut self) {
        tracing::debug!(models = self.models.len(), "Disposing models");
        self.order.clear();
        self.models.clear();
    }
}
