//! Logging utilities and structured logging support
//!
//! Every query module logs through the `log` facade; embedding applications
//! pick the backend. These helpers install `env_logger` for tools and tests.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
///
/// Panics if a logger is already installed, like `env_logger::init`.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring an already-installed logger
///
/// Safe to call from every test and from libraries that embed the editor.
pub fn try_init() -> bool {
    env_logger::Builder::from_default_env()
        .is_test(cfg!(test))
        .try_init()
        .is_ok()
}

/// Initialize logging with a fixed level filter, ignoring `RUST_LOG`
pub fn try_init_with_level(level: log::LevelFilter) -> bool {
    env_logger::Builder::new()
        .filter_level(level)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_tolerates_repeat_calls() {
        try_init();
        assert!(!try_init());
        assert!(!try_init_with_level(log::LevelFilter::Debug));
        debug!("logger installed");
    }
}
