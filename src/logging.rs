use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this twice is
/// harmless; the second install is ignored.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
