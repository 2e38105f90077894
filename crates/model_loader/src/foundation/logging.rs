//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace, LevelFilter};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a fixed default level
///
/// `RUST_LOG` still overrides the level when it is set.
pub fn init_with_level(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A second initialization (tests, embedding apps) keeps the first logger.
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
