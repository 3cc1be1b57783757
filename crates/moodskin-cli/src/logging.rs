//! Tracing subscriber setup for the `moodskin` binary.
//!
//! Logs always go to stderr so command output on stdout stays pipeable.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default filter directive for a verbosity level: 0 = info, 1 = debug, 2+ = trace.
///
/// `RUST_LOG` overrides it (e.g. `RUST_LOG=moodskin_application=debug,reqwest=warn`).
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "moodskin=error,moodskin_core=error,moodskin_infrastructure=error,moodskin_interaction=error,moodskin_application=error";
    }
    match verbose {
        0 => "moodskin=info,moodskin_core=info,moodskin_infrastructure=info,moodskin_interaction=info,moodskin_application=info",
        1 => "moodskin=debug,moodskin_core=debug,moodskin_infrastructure=debug,moodskin_interaction=debug,moodskin_application=debug",
        _ => "moodskin=trace,moodskin_core=trace,moodskin_infrastructure=trace,moodskin_interaction=trace,moodskin_application=trace",
    }
}

/// Initializes the global subscriber.
///
/// | Mode | TTY | Output |
/// |------|-----|--------|
/// | JSON | any | JSON lines |
/// | Human | yes | colored |
/// | Human | no | compact, no ANSI |
pub fn init_logging(json: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else if io::stderr().is_terminal() {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .compact()
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in 0..3 {
            assert!(EnvFilter::try_new(default_directive(verbose, false)).is_ok());
        }
        assert!(EnvFilter::try_new(default_directive(0, true)).is_ok());
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(default_directive(0, false).starts_with("moodskin=info"));
        assert!(default_directive(1, false).starts_with("moodskin=debug"));
        assert!(default_directive(5, false).starts_with("moodskin=trace"));
        assert!(default_directive(2, true).starts_with("moodskin=error"));
    }
}
