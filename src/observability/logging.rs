//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level. JSON output is meant
//! for hosted deployments, pretty output for local development.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Directive used when neither `RUST_LOG` nor the config yields a valid one.
const FALLBACK_DIRECTIVE: &str = "newsroom_gateway=info,tower_http=info";

/// Build the filter for `level`.
///
/// A bare level such as `debug` is scoped to this crate and `tower_http`;
/// anything containing `=` or `,` is taken as a full directive.
pub fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = level.trim();
    let directive = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("newsroom_gateway={level},tower_http={level}")
    };

    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// Install the global subscriber. Must be called once, before any spans.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = build_filter(&config.log_level);

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .json()
                    .with_current_span(true),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init(),
    }
}
