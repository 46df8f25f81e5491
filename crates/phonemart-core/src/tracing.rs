use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the JSON stdout subscriber for a service.
///
/// `RUST_LOG` wins when set; otherwise `default_directives` applies. Later calls are
/// no-ops, so tests may call it freely.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(true).with_target(true))
        .try_init();
}
