// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

/// A source of raw string configuration values, keyed by name.
pub trait ConfigSource {
    /// Returns the raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from the process environment. The only source used
/// outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory source, for tests that need deterministic config without
/// touching the real environment.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: BTreeMap<String, String>,
}

impl MapConfigSource {
    /// Builds a source from an iterator of key/value pairs.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
