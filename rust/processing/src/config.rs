// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loader configuration loaded from environment variables.

use ifc_fragments::rebase::{
    DEFAULT_ANCHOR_LATITUDE, DEFAULT_ANCHOR_LONGITUDE, DEFAULT_REBASE_SCALE,
};
use ifc_fragments::{GeoAnchor, GeoRebase};
use std::str::FromStr;

/// Both producers must be able to run at once
const MIN_WORKER_THREADS: usize = 2;

/// Loader configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Threads in the producer pool.
    pub worker_threads: usize,
    /// Model scale applied when rebasing onto a map host.
    pub rebase_scale: f64,
    /// WGS84 longitude the model origin is pinned to.
    pub anchor_longitude: f64,
    /// WGS84 latitude the model origin is pinned to.
    pub anchor_latitude: f64,
    /// Whether loaded models are rebased onto the map host.
    pub rebase_enabled: bool,
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_or = |key: &str, default| parse_value(lookup(key), default);

        Self {
            worker_threads: parse_thread_count(lookup("IFC_FRAGMENTS_WORKER_THREADS"))
                .max(MIN_WORKER_THREADS),
            rebase_scale: parse_or("IFC_FRAGMENTS_REBASE_SCALE", DEFAULT_REBASE_SCALE),
            anchor_longitude: parse_or("IFC_FRAGMENTS_ANCHOR_LON", DEFAULT_ANCHOR_LONGITUDE),
            anchor_latitude: parse_or("IFC_FRAGMENTS_ANCHOR_LAT", DEFAULT_ANCHOR_LATITUDE),
            rebase_enabled: parse_value(lookup("IFC_FRAGMENTS_REBASE"), true),
        }
    }

    /// Anchor with elevation still unknown
    pub fn anchor(&self) -> GeoAnchor {
        GeoAnchor::new(self.anchor_longitude, self.anchor_latitude)
    }

    pub fn rebase(&self) -> GeoRebase {
        GeoRebase::with_scale(self.rebase_scale)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_value<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_thread_count(value: Option<String>) -> usize {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_else(num_cpus::get)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rustc_hash::FxHashMap;

    fn config(vars: &[(&str, &str)]) -> LoaderConfig {
        let vars: FxHashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoaderConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert!(config.worker_threads >= MIN_WORKER_THREADS);
        assert_relative_eq!(config.rebase_scale, 1000.0);
        assert_relative_eq!(config.anchor_longitude, 10.544538805374891);
        assert_relative_eq!(config.anchor_latitude, 46.50861247649143);
        assert!(config.rebase_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("IFC_FRAGMENTS_WORKER_THREADS", "6"),
            ("IFC_FRAGMENTS_REBASE_SCALE", "1"),
            ("IFC_FRAGMENTS_ANCHOR_LON", "-0.1276"),
            ("IFC_FRAGMENTS_ANCHOR_LAT", " 51.5072 "),
            ("IFC_FRAGMENTS_REBASE", "false"),
        ]);
        assert_eq!(config.worker_threads, 6);
        assert_relative_eq!(config.rebase().scale, 1.0);
        assert_eq!(config.anchor(), GeoAnchor::new(-0.1276, 51.5072));
        assert!(!config.rebase_enabled);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("IFC_FRAGMENTS_WORKER_THREADS", "1"),
            ("IFC_FRAGMENTS_REBASE_SCALE", "big"),
            ("IFC_FRAGMENTS_REBASE", "maybe"),
        ]);
        assert_eq!(config.worker_threads, MIN_WORKER_THREADS);
        assert_relative_eq!(config.rebase_scale, 1000.0);
        assert!(config.rebase_enabled);
    }
}
