//! Typed snapshot of the environment variables the backend consumes.
//!
//! Everything is read once at startup; the rest of the app works from this
//! struct instead of poking `std::env` at arbitrary points.

use std::env;

use db_bootstrap::RuntimeEnv;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppEnv {
    pub runtime_env: RuntimeEnv,
    pub host: String,
    pub port: u16,
    /// `ANALYZE=true` turns on the bundle report.
    pub analyze: bool,
    /// Opt-out: i18n is composed in unless this is set.
    pub i18n_disabled: bool,
    /// Opt-out: error tracking is composed in unless this is set.
    pub error_tracking_disabled: bool,
    pub error_tracking_org: Option<String>,
    pub error_tracking_project: Option<String>,
    /// Set by CI runners; error-tracking uploads stay silent outside CI.
    pub ci: bool,
}

impl AppEnv {
    pub fn from_env() -> Result<Self, AppError> {
        let runtime_env = RuntimeEnv::from_env()?;

        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_raw = env::var("BACKEND_PORT").unwrap_or_else(|_| "3001".to_string());
        let port = port_raw.parse::<u16>().map_err(|_| {
            AppError::config(format!(
                "BACKEND_PORT must be a valid port number, got '{port_raw}'"
            ))
        })?;

        Ok(Self {
            runtime_env,
            host,
            port,
            analyze: flag_is_true("ANALYZE"),
            i18n_disabled: flag_is_set("I18N_DISABLED"),
            error_tracking_disabled: flag_is_set("ERROR_TRACKING_DISABLED"),
            error_tracking_org: optional("ERROR_TRACKING_ORG"),
            error_tracking_project: optional("ERROR_TRACKING_PROJECT"),
            ci: flag_is_set("CI"),
        })
    }
}

/// Opt-in flags must literally be `true`.
fn flag_is_true(name: &str) -> bool {
    env::var(name).map(|v| v == "true").unwrap_or(false)
}

/// Opt-out flags count when set to any non-empty value.
fn flag_is_set(name: &str) -> bool {
    env::var(name)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
