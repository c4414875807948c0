use {
    tracing_subscriber::{prelude::*, EnvFilter},
};

// logs go to stderr so that reports printed to stdout stay valid json
pub fn init_logging() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish()
        .init();
}
