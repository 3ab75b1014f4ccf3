use thiserror::Error;

/// Errors surfaced by the database bootstrap.
///
/// Skipping the connection on purpose (missing URL, local host) is not an
/// error; these variants cover genuinely broken configuration, a failed
/// connection attempt, or a failed migration run.
#[derive(Error, Debug)]
pub enum DbBootstrapError {
    #[error("Configuration error: {message}")]
    Config { message: String },
    #[error("Connection error: {message}")]
    Connect { message: String },
    #[error("Migration error: {message}")]
    Migrate { message: String },
}

impl DbBootstrapError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    pub fn migrate(message: impl Into<String>) -> Self {
        Self::Migrate {
            message: message.into(),
        }
    }
}
