//! Hoard Core
//!
//! Core types, traits, and error handling for the hoard archive cache.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used by the cache engine and the CLI.

pub mod cache;
pub mod error;
pub mod ports;

pub use cache::{
    ArchiveEntry, CompressionMethod, MAX_CANDIDATE_KEYS, MAX_KEY_LENGTH, RestoreOptions,
    SAVE_FAILED, SaveOptions,
};
pub use error::{Error, Result};
