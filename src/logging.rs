use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise dev mode logs at `debug` and normal
/// runs at `info`. Calling this twice is a no-op.
pub fn init(dev_mode: bool) {
    let fallback = if dev_mode { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber installed earlier (e.g. by a test harness) stays in place
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        debug!(error = %e, "tracing subscriber already installed");
    }
}
