//! Utility functions and helpers.
//!
//! Common functionality used across multiple ipa-repo crates.

pub mod fs;
pub mod hash;
pub mod path;

// Re-export commonly used utilities
pub use fs::{to_pretty_json, write_atomic};
pub use hash::{blake3_hash, blake3_hash_file};
pub use path::{package_stem, validate_package_file_name, validate_package_stem};
