use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns false if a global subscriber was already installed.
pub fn init_logging() -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        init_logging();
        assert!(!init_logging());
    }
}
