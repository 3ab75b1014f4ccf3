//! Logging initialization for tests.
//!
//! Call `init` at the top of any test (or from a `ctor` hook); repeated and
//! concurrent calls are fine. The filter comes from `TEST_LOG`, then
//! `RUST_LOG`, then defaults to `warn` so passing runs stay quiet.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the test subscriber once per process.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // cargo captures output per test
            .without_time()
            .try_init()
            .ok();
    });
}
