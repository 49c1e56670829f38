//! Test utilities for pipeline-structure
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] - Once-only tracing setup honoring `RUST_LOG`
//! - [`SampleProject`] - A throwaway project directory with a configuration
//!   file and files laid out according to a template table
//!
//! # Example
//!
//! ```rust,no_run
//! use pipeline_structure::test_utils::SampleProject;
//!
//! let project = SampleProject::new().unwrap();
//! project.write_config(r#"{"globals": {"project_name": "demo"}}"#).unwrap();
//! project.touch("03_Production/Assets/char/hero/Scenefiles/mod/main/hero_main_v0001.hip").unwrap();
//! ```

pub mod fixtures;

pub use fixtures::SampleProject;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without logging.
///
/// ```bash
/// RUST_LOG=pipeline_structure=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
