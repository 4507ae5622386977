//! Runtime environment resolution.
//!
//! Environment variables are read per request through [`EnvProvider`], never
//! cached at startup. Everything downstream works on a [`RuntimeEnv`]
//! snapshot so the resolution rules stay pure.

use crate::config::schema::BackendConfig;

/// Explicit backend origin override.
pub const BACKEND_URL: &str = "BACKEND_URL";
/// Public API URL, used as the production backend when set.
pub const PUBLIC_API_URL: &str = "NEXT_PUBLIC_API_URL";
/// Public URL of the site itself.
pub const PUBLIC_APP_URL: &str = "NEXT_PUBLIC_APP_URL";
/// Frontend origin used as the CORS fallback.
pub const PUBLIC_FRONTEND_URL: &str = "NEXT_PUBLIC_FRONTEND_URL";

/// A snapshot of the recognized environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub backend_url: Option<String>,
    pub public_api_url: Option<String>,
    pub public_app_url: Option<String>,
    pub frontend_url: Option<String>,
    pub node_env: Option<String>,
    pub vercel_env: Option<String>,
    pub render: Option<String>,
}

impl RuntimeEnv {
    /// Read the recognized variables from the process environment.
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary lookup function.
    ///
    /// Empty or whitespace-only values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            backend_url: get(BACKEND_URL),
            public_api_url: get(PUBLIC_API_URL),
            public_app_url: get(PUBLIC_APP_URL),
            frontend_url: get(PUBLIC_FRONTEND_URL),
            node_env: get("NODE_ENV"),
            vercel_env: get("VERCEL_ENV"),
            render: get("RENDER"),
        }
    }

    /// A snapshot that forces the backend origin. Used by tests and embedders.
    pub fn with_backend(url: impl Into<String>) -> Self {
        Self {
            backend_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// True when any of the platform production flags is set.
    pub fn is_production(&self) -> bool {
        self.node_env.as_deref() == Some("production")
            || self.vercel_env.as_deref() == Some("production")
            || self.render.as_deref() == Some("true")
    }
}

/// Source of [`RuntimeEnv`] snapshots.
#[derive(Debug, Clone, Default)]
pub enum EnvProvider {
    /// Re-read the process environment on every call.
    #[default]
    Process,
    /// Always return the same snapshot.
    Fixed(RuntimeEnv),
}

impl EnvProvider {
    pub fn snapshot(&self) -> RuntimeEnv {
        match self {
            EnvProvider::Process => RuntimeEnv::from_process(),
            EnvProvider::Fixed(env) => env.clone(),
        }
    }
}

/// Resolve the backend origin.
///
/// Precedence: `BACKEND_URL`, then the production origin (public API URL or
/// the configured production default) when running in production, then the
/// configured development origin. The result never ends with a slash.
pub fn resolve_backend_url(env: &RuntimeEnv, defaults: &BackendConfig) -> String {
    let origin = if let Some(explicit) = env.backend_url.as_deref() {
        explicit
    } else if env.is_production() {
        env.public_api_url
            .as_deref()
            .unwrap_or(defaults.production_origin.as_str())
    } else {
        defaults.development_origin.as_str()
    };

    origin.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> RuntimeEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeEnv::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_explicit_override_wins() {
        let env = env_from(&[
            ("BACKEND_URL", "https://staging.example.com/"),
            ("NODE_ENV", "production"),
            ("NEXT_PUBLIC_API_URL", "https://public.example.com"),
        ]);
        assert_eq!(
            resolve_backend_url(&env, &BackendConfig::default()),
            "https://staging.example.com"
        );
    }

    #[test]
    fn test_production_flags() {
        let defaults = BackendConfig::default();
        for (key, value) in [("NODE_ENV", "production"), ("VERCEL_ENV", "production"), ("RENDER", "true")] {
            let env = env_from(&[(key, value)]);
            assert!(env.is_production(), "{key}={value} should mean production");
            assert_eq!(resolve_backend_url(&env, &defaults), "https://api.dailyvaibe.com");
        }

        let env = env_from(&[("RENDER", "false")]);
        assert!(!env.is_production());
    }

    #[test]
    fn test_production_prefers_public_api_url() {
        let env = env_from(&[
            ("NODE_ENV", "production"),
            ("NEXT_PUBLIC_API_URL", "https://api.other.example//"),
        ]);
        assert_eq!(
            resolve_backend_url(&env, &BackendConfig::default()),
            "https://api.other.example"
        );
    }

    #[test]
    fn test_development_fallback_ignores_public_api_url() {
        let env = env_from(&[("NEXT_PUBLIC_API_URL", "https://api.other.example")]);
        assert_eq!(
            resolve_backend_url(&env, &BackendConfig::default()),
            "http://localhost:5000"
        );
    }

    #[test]
    fn test_blank_values_are_unset() {
        let env = env_from(&[("BACKEND_URL", "   ")]);
        assert_eq!(env.backend_url, None);
        assert_eq!(
            resolve_backend_url(&env, &BackendConfig::default()),
            "http://localhost:5000"
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let env = env_from(&[("NODE_ENV", "production")]);
        let defaults = BackendConfig::default();
        assert_eq!(resolve_backend_url(&env, &defaults), resolve_backend_url(&env, &defaults));
    }
}
