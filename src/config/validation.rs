//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but cannot work
//! (unbindable addresses, zero timeouts, non-HTTP origins). Every failure is
//! reported, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::resilience::backoff::calculate_backoff;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not an absolute http(s) origin")]
    InvalidOrigin { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffInverted { base: u64, max: u64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("timeouts.request_secs ({request_ms}ms) is shorter than a full retry run ({required_ms}ms)")]
    DeadlineTooShort { request_ms: u64, required_ms: u64 },
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    check_origin(&mut errors, "backend.production_origin", &config.backend.production_origin);
    check_origin(&mut errors, "backend.development_origin", &config.backend.development_origin);
    check_origin(&mut errors, "cors.default_origin", &config.cors.default_origin);

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_body_bytes" });
    }
    if config.timeouts.backend_ms == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.backend_ms" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::BackoffInverted {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    let request_ms = config.timeouts.request_secs.saturating_mul(1000);
    let required_ms = retry_budget_ms(config);
    if request_ms < required_ms {
        errors.push(ValidationError::DeadlineTooShort { request_ms, required_ms });
    }

    if config.session.cookie_name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "session.cookie_name" });
    }
    if config.session.legacy_cookie_name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "session.legacy_cookie_name" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Worst-case duration of one backend call: every attempt timing out plus
/// every backoff sleep, for the larger of the read and write retry counts.
pub fn retry_budget_ms(config: &GatewayConfig) -> u64 {
    let retries = &config.retries;
    let max_retries = retries.max_retries.max(retries.mutating_max_retries);
    let attempts = u64::from(max_retries) + 1;
    let backoff: u64 = (0..max_retries)
        .map(|attempt| calculate_backoff(attempt, retries.base_delay_ms, retries.max_delay_ms).as_millis() as u64)
        .fold(0, u64::saturating_add);

    attempts
        .saturating_mul(config.timeouts.backend_ms)
        .saturating_add(backoff)
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_origin(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidOrigin {
            field,
            value: value.to_string(),
        });
    }
}
