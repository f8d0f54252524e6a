use tracing_subscriber::{fmt, EnvFilter};

/// Install the process subscriber. Filter from `RUST_LOG` (default `info`),
/// JSON lines when `NITRO_ARK_LOG_JSON=1`. Later calls are no-ops.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("NITRO_ARK_LOG_JSON")
        .map(|value| value == "1")
        .unwrap_or(false);

    // Mobile log collectors read stderr; ANSI colours only add noise there.
    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
