// SPDX-License-Identifier: Apache-2.0
//! Environment-variable-backed configuration port.
//!
//! Shaped the same way a filesystem-backed config store would be: a small
//! `ConfigSource` trait that can be swapped for tests, and a `ConfigService`
//! that knows how to turn raw key/value pairs into a typed, validated
//! [`GridkeepConfig`]. The only real source in production is
//! [`EnvConfigSource`]; tests use an in-memory one.

#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]

mod config;
mod error;
mod source;

pub use config::{ConfigService, GridkeepConfig};
pub use error::ConfigError;
pub use source::{ConfigSource, EnvConfigSource, MapConfigSource};
