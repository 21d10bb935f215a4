use log::LevelFilter;

/// Initialize the logger with the specified level. Per-module directives in `RUST_LOG` still apply.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}
