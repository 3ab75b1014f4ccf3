//! Conditional composition of the application configuration.
//!
//! The final `AppConfig` is a base configuration passed through up to three
//! optional wrappers: i18n, the bundle report, and error tracking. Each
//! wrapper is gated by environment flags, adds its own settings, and leaves
//! everything else untouched. Composition is pure; applying a wrapper only
//! shapes the value the server is later started from.
//!
//! Order is fixed: i18n, then bundle report, then error tracking. The
//! `applied` ledger records which wrappers actually ran.

use std::fmt::Write as _;

use serde::Serialize;

use crate::config::env::AppEnv;

/// Identifies a wrapper in the applied ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    I18n,
    BundleReport,
    ErrorTracking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct I18nSettings {
    pub default_locale: String,
    pub locales_dir: String,
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales_dir: "locales".to_string(),
        }
    }
}

/// Output shape of the startup bundle report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ReportSettings {
    pub mode: ReportMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorTrackingSettings {
    pub org: Option<String>,
    pub project: Option<String>,
    /// Upload chatter is suppressed outside CI.
    pub silent: bool,
}

/// Composed application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Responses never advertise the server implementation.
    pub suppress_server_header: bool,
    pub i18n: Option<I18nSettings>,
    pub report: Option<ReportSettings>,
    pub error_tracking: Option<ErrorTrackingSettings>,
    /// Wrappers applied, in application order.
    pub applied: Vec<PluginKind>,
}

impl AppConfig {
    /// Base configuration before any wrapper runs.
    pub fn base(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            suppress_server_header: true,
            i18n: None,
            report: None,
            error_tracking: None,
            applied: Vec::new(),
        }
    }

    pub fn with_i18n(mut self, settings: I18nSettings) -> Self {
        self.i18n = Some(settings);
        self.applied.push(PluginKind::I18n);
        self
    }

    pub fn with_bundle_report(mut self, settings: ReportSettings) -> Self {
        self.report = Some(settings);
        self.applied.push(PluginKind::BundleReport);
        self
    }

    pub fn with_error_tracking(mut self, settings: ErrorTrackingSettings) -> Self {
        self.error_tracking = Some(settings);
        self.applied.push(PluginKind::ErrorTracking);
        self
    }
}

/// Compose the final configuration from the environment snapshot.
///
/// i18n is on unless `I18N_DISABLED` is set; the bundle report is on only
/// when `ANALYZE=true`; error tracking is on unless
/// `ERROR_TRACKING_DISABLED` is set.
pub fn compose_config(env: &AppEnv) -> AppConfig {
    let mut config = AppConfig::base(env.host.clone(), env.port);

    if !env.i18n_disabled {
        config = config.with_i18n(I18nSettings::default());
    }

    if env.analyze {
        config = config.with_bundle_report(ReportSettings::default());
    }

    if !env.error_tracking_disabled {
        config = config.with_error_tracking(ErrorTrackingSettings {
            org: env.error_tracking_org.clone(),
            project: env.error_tracking_project.clone(),
            silent: !env.ci,
        });
    }

    config
}

/// Render the startup report for a composed configuration.
pub fn render_report(config: &AppConfig) -> String {
    let mode = config.report.map(|r| r.mode).unwrap_or_default();
    match mode {
        ReportMode::Json => {
            serde_json::to_string_pretty(config).unwrap_or_else(|_| "{}".to_string())
        }
        ReportMode::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "configuration report");
            let _ = writeln!(out, "  listen: {}:{}", config.host, config.port);
            let _ = writeln!(
                out,
                "  server header suppressed: {}",
                config.suppress_server_header
            );
            if let Some(i18n) = &config.i18n {
                let _ = writeln!(
                    out,
                    "  i18n: default_locale={} dir={}",
                    i18n.default_locale, i18n.locales_dir
                );
            }
            if let Some(tracking) = &config.error_tracking {
                let _ = writeln!(
                    out,
                    "  error tracking: org={} project={} silent={}",
                    tracking.org.as_deref().unwrap_or("-"),
                    tracking.project.as_deref().unwrap_or("-"),
                    tracking.silent
                );
            }
            let _ = writeln!(out, "  applied: {:?}", config.applied);
            out
        }
    }
}
