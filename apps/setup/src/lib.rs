//! # Ultimate Setup
//!
//! The application layer around `setup-core`: HTTP API, CLI, configuration
//! file and catalog loading. This is the only async, network-aware crate.

pub mod api;
pub mod catalog_source;
pub mod cli;
pub mod config;
