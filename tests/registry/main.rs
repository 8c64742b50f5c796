//! Integration tests for Layer 2: Registry
//!
//! Tests for the identifier directory, attachment validation, the query
//! family, and end-to-end annotation scenarios.

mod attachment;
mod queries;
mod scenarios;

use tracing_subscriber::filter::LevelFilter;

/// Routes registry logging to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}
