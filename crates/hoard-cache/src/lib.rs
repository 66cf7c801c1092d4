//! Key-addressed archive cache on local disk, falling back to a remote cache
//! service when no cache directory is configured.

pub mod archiver;
pub mod backend;
pub mod compression;
pub mod keys;
pub mod paths;
pub mod permissions;
pub mod provider;
pub mod remote;
pub mod validation;

pub use archiver::TarCodec;
pub use backend::CacheClient;
pub use compression::resolve_compression_method;
pub use keys::{cache_file_name, compute_version, sanitize_key};
pub use paths::resolve_paths;
pub use permissions::{ChownCommand, SkipOwnership};
pub use provider::{LocalCacheConfig, LocalDiskCache};
pub use remote::UnconfiguredRemote;
pub use validation::{candidate_keys, validate_key, validate_paths};
