//! ipa-repo benchmarking suite
//!
//! Benchmarks for package reading and catalog regeneration.

pub mod common;

pub use common::*;
