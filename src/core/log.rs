use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Logs go to stderr so rate tables on stdout stay pipeable.
/// `RUST_LOG` overrides the defaults.
pub fn init_logging(verbose: bool) {
    let directive = if verbose {
        "mnb_rates=debug"
    } else {
        "mnb_rates=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time(),
        )
        .with(filter)
        .init();
}
