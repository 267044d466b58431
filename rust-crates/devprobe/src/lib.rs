//! devprobe library
//!
//! Exposes the binary's modules for integration testing.

pub mod cli;
pub mod config;
pub mod version;
