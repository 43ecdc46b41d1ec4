//! Error types for the database procedures.

/// Every failure either procedure can hit before it is flattened into the
/// `(status, message)` pair handed back to the database.
#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("Unknown SMTP client identifier: {code}")]
    UnknownClient { code: i32 },

    #[error("Invalid SMTP override for {field}: {reason}")]
    InvalidOverride { field: &'static str, reason: String },

    #[error("The specified string is not in the form required for an e-mail address: '{address}'")]
    AddressFormat {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("A recipient must be specified")]
    NoRecipients,

    #[error("Failed to build the e-mail message")]
    MessageBuild(#[source] lettre::error::Error),

    #[error("Failure sending mail through {host}:{port}")]
    Smtp {
        host: String,
        port: u16,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("Failed to build the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("The remote server returned an error: ({status}) {reason}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProcedureError {
    /// Label of the layer that raised this error, reported as `Source:`.
    pub fn origin(&self) -> &'static str {
        match self {
            Self::UnknownClient { .. } | Self::InvalidOverride { .. } => "sqlext::profile",
            Self::AddressFormat { .. } | Self::NoRecipients => "sqlext::recipients",
            Self::MessageBuild(_) | Self::Smtp { .. } => "sqlext::mail",
            Self::HttpClient(_) | Self::Http { .. } | Self::HttpStatus { .. } => "sqlext::stage",
            Self::Config(_) => "sqlext::config",
        }
    }

    /// Label of the library behind the chained cause, if there is one.
    pub fn cause_origin(&self) -> Option<&'static str> {
        match self {
            Self::AddressFormat { .. } | Self::MessageBuild(_) | Self::Smtp { .. } => Some("lettre"),
            Self::HttpClient(_) | Self::Http { .. } => Some("reqwest"),
            _ => None,
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
