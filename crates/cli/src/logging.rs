//! Tracing subscriber for the `larder` binary.
//!
//! Logs go to stderr; stdout carries only command output. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub(crate) fn default_filter(quiet: bool) -> &'static str {
    if quiet {
        "larder=warn"
    } else {
        "larder=info"
    }
}

pub(crate) fn init(quiet: bool) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(quiet).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_lowers_the_default_level() {
        assert_eq!(default_filter(false), "larder=info");
        assert_eq!(default_filter(true), "larder=warn");
    }
}
