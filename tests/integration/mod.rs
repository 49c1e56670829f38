//! Integration test suite for pipeline-structure
//!
//! End-to-end tests of the library API over the built-in presets and of the
//! `pstruct` binary against throwaway projects on disk.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: Template resolution over the presets and custom tables
//! - **extraction**: Parsing paths back into tokens
//! - **matching**: Finding files on disk that fit a template
//! - **config**: Project configuration discovery and overrides
//! - **commands**: The `pstruct` subcommands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod commands;
mod config;
mod extraction;
mod matching;
mod resolution;
