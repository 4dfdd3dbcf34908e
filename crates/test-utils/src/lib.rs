//! Shared test support for gcmd: job/CLI builders, a scripted process
//! backend, and a handler recorder.

pub mod builders;
pub mod fake_backend;
pub mod recorder;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use gcmd::logging::{LOG_ENV, build_filter};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for any single engine run in a test.
pub const TEST_DEADLINE: Duration = Duration::from_secs(10);

/// Install a test subscriber once per test binary.
///
/// Output is captured per test and only shown for failures (or with
/// `--nocapture`). The filter follows `GCMD_LOG` like the binary does,
/// e.g. `GCMD_LOG=gcmd::exec=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env_value = std::env::var(LOG_ENV).ok();
        let filter = build_filter(None, env_value.as_deref())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, f).await {
        Ok(value) => value,
        Err(_) => panic!("run did not finish within {TEST_DEADLINE:?}"),
    }
}
