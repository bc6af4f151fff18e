// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

/// Failures loading or validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is set to {raw:?}, which is not a valid {expected}")]
    InvalidValue {
        key: &'static str,
        raw: String,
        expected: &'static str,
    },
}
