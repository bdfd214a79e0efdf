use log::LevelFilter;

/// Initialize logging using env_logger.
/// Defaults to `info`; `RUST_LOG` overrides it,
/// e.g. `RUST_LOG=iso_console_core=debug iso-console --api-url http://host:8081/api/iso8583`
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}
