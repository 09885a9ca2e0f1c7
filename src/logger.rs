use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
};

/// Installs the global subscriber. `RUST_LOG` overrides the `default_level`
/// directive; at debug level span close events with their durations are logged too.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let is_debug = is_debug_filter(&env_filter.to_string());

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn is_debug_filter(directives: &str) -> bool {
    directives.contains("debug") || directives.contains("trace")
}

#[cfg(test)]
mod tests {
    use super::is_debug_filter;

    #[test]
    fn test_debug_detection() {
        assert!(is_debug_filter("debug"));
        assert!(is_debug_filter("info,simple_hdr_rs=trace"));
        assert!(!is_debug_filter("info"));
        assert!(!is_debug_filter("warn,simple_hdr_rs=info"));
    }
}
