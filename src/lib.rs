//! Av1an/rav1e wrapper for StaxRip.
//!
//! StaxRip can only launch one program with `-i`, `-o`, `-t` (and optionally the
//! install directory) substituted in. This crate turns those into a full av1an
//! command line, picking worker count and thread affinity from the CPU topology.

pub mod config;
pub mod engine;
