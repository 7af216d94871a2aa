use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global fmt subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Returns an error when a global
/// subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = filter_or_default(std::env::var(EnvFilter::DEFAULT_ENV).ok());

    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}

/// Filter from the given directives, or `info` when they are absent or invalid
fn filter_or_default(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
