use std::sync::Once;
use tracing::Level;

use crate::config::get_env_or_default;

static INIT: Once = Once::new();

/// Initializes the global tracing subscriber once per process. Level comes
/// from `LOGLEVEL` (default DEBUG). Safe to call from every test.
pub fn setup_logger() {
    INIT.call_once(|| {
        let level = match get_env_or_default("LOGLEVEL", String::from("DEBUG"))
            .to_uppercase()
            .as_str()
        {
            "TRACE" => Level::TRACE,
            "INFO" => Level::INFO,
            "WARN" => Level::WARN,
            "ERROR" => Level::ERROR,
            _ => Level::DEBUG,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .try_init();
    });
}
