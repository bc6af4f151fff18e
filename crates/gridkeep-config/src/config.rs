// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::ConfigSource;

const KEYFRAME_JOURNAL_CAPACITY: &str = "KEYFRAME_JOURNAL_CAPACITY";
const KEYFRAME_JOURNAL_MAX_AGE_MS: &str = "KEYFRAME_JOURNAL_MAX_AGE_MS";
const DEBUG_TELEMETRY: &str = "DEBUG_TELEMETRY";

/// The server's full, validated runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridkeepConfig {
    /// Maximum number of keyframes the journal retains at once.
    pub keyframe_journal_capacity: usize,
    /// Maximum age, in milliseconds, a keyframe is retained before
    /// eviction regardless of capacity.
    pub keyframe_journal_max_age_ms: u64,
    /// Raises the per-tick debug span to `debug` level when set.
    pub debug_telemetry: bool,
}

impl Default for GridkeepConfig {
    fn default() -> Self {
        Self {
            keyframe_journal_capacity: 8,
            keyframe_journal_max_age_ms: 5_000,
            debug_telemetry: false,
        }
    }
}

/// Loads and validates [`GridkeepConfig`] from a [`ConfigSource`].
pub struct ConfigService<S> {
    source: S,
}

impl<S: ConfigSource> ConfigService<S> {
    /// Builds a service over the given source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Loads configuration, falling back to defaults for unset variables
    /// and returning an error for a set-but-unparsable one.
    pub fn load(&self) -> Result<GridkeepConfig, ConfigError> {
        let defaults = GridkeepConfig::default();

        let keyframe_journal_capacity = match self.source.get(KEYFRAME_JOURNAL_CAPACITY) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: KEYFRAME_JOURNAL_CAPACITY,
                    raw,
                    expected: "positive integer",
                })?,
            None => defaults.keyframe_journal_capacity,
        };

        let keyframe_journal_max_age_ms = match self.source.get(KEYFRAME_JOURNAL_MAX_AGE_MS) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: KEYFRAME_JOURNAL_MAX_AGE_MS,
                    raw,
                    expected: "non-negative integer milliseconds",
                })?,
            None => defaults.keyframe_journal_max_age_ms,
        };

        let debug_telemetry = match self.source.get(DEBUG_TELEMETRY) {
            Some(raw) => match raw.as_str() {
                "1" | "true" | "TRUE" | "True" => true,
                "0" | "false" | "FALSE" | "False" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: DEBUG_TELEMETRY,
                        raw,
                        expected: "boolean (1/0, true/false)",
                    })
                }
            },
            None => defaults.debug_telemetry,
        };

        Ok(GridkeepConfig {
            keyframe_journal_capacity,
            keyframe_journal_max_age_ms,
            debug_telemetry,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use crate::source::MapConfigSource;

    use super::*;

    #[test]
    fn defaults_when_unset() {
        let service = ConfigService::new(MapConfigSource::default());
        assert_eq!(service.load(), Ok(GridkeepConfig::default()));
    }

    #[test]
    fn parses_set_values() {
        let service = ConfigService::new(MapConfigSource::new([
            (KEYFRAME_JOURNAL_CAPACITY.to_string(), "10".to_string()),
            (DEBUG_TELEMETRY.to_string(), "true".to_string()),
        ]));
        let cfg = service.load().expect("valid config");
        assert_eq!(cfg.keyframe_journal_capacity, 10);
        assert!(cfg.debug_telemetry);
    }

    #[test]
    fn rejects_unparsable_value() {
        let service = ConfigService::new(MapConfigSource::new([(
            KEYFRAME_JOURNAL_CAPACITY.to_string(),
            "not-a-number".to_string(),
        )]));
        assert!(service.load().is_err());
    }
}
