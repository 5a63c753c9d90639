use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Calling it again keeps the first subscriber, so tests and binaries may both call it.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_directive).unwrap_or_else(|err| {
            eprintln!("invalid log directive '{}' ({}), using info", default_directive, err);
            EnvFilter::new("info")
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .ok();
}
