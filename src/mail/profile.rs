//! SMTP transport profiles: client identifier to relay settings.
//!
//! Identifier `0` is the caller-configured profile (host, port and flags come
//! from the procedure arguments). Identifiers `1..=4` are fixed presets that
//! ignore those arguments.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::constants::GENERAL_SMTP_TIMEOUT;
use crate::error::ProcedureError;

/// Known SMTP client configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientId {
    General = 0,
    Gmail = 1,
    SecureServer = 2,
    Exchange = 3,
    Company = 4,
}

impl ClientId {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::General),
            1 => Some(Self::Gmail),
            2 => Some(Self::SecureServer),
            3 => Some(Self::Exchange),
            4 => Some(Self::Company),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Gmail => "gmail",
            Self::SecureServer => "secure-server",
            Self::Exchange => "exchange",
            Self::Company => "company",
        }
    }
}

/// How the message reaches the relay. Only direct network delivery exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Network,
}

/// Credentials presented to the relay.
#[derive(Debug)]
pub enum CredentialMode {
    /// Authenticate as the sender.
    Explicit {
        username: String,
        password: SecretString,
    },
    /// Rely on the relay trusting the host; no AUTH is attempted.
    Ambient,
}

impl CredentialMode {
    pub fn is_ambient(&self) -> bool {
        matches!(self, Self::Ambient)
    }
}

/// A fixed relay entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub client: ClientId,
    pub host: &'static str,
    pub port: u16,
    pub enable_tls: bool,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        client: ClientId::Gmail,
        host: "smtp.gmail.com",
        port: 587,
        enable_tls: true,
    },
    Preset {
        client: ClientId::SecureServer,
        host: "relay-hosting.secureserver.net",
        port: 25,
        enable_tls: false,
    },
    Preset {
        client: ClientId::Exchange,
        host: "mail.server1.org.mx",
        port: 25,
        enable_tls: false,
    },
    Preset {
        client: ClientId::Company,
        host: "mail.server2.com",
        port: 25,
        enable_tls: false,
    },
];

pub fn preset(client: ClientId) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.client == client)
}

/// Raw connection arguments, honoured only by [`ClientId::General`].
///
/// Integer flags follow the procedure convention: `> 0` means true.
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    pub host: String,
    pub port: i32,
    pub enable_ssl: i32,
    pub use_default_credentials: i32,
}

/// Sender account used for explicit authentication.
#[derive(Debug)]
pub struct SenderCredentials {
    pub address: String,
    pub password: SecretString,
}

impl SenderCredentials {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        let address: String = address.into();
        let password: String = password.into();
        Self {
            address: address.trim().to_string(),
            password: SecretString::from(password),
        }
    }

    fn explicit(&self) -> CredentialMode {
        CredentialMode::Explicit {
            username: self.address.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

/// Fully resolved relay settings for one dispatch.
#[derive(Debug)]
pub struct TransportProfile {
    pub client: ClientId,
    pub host: String,
    pub port: u16,
    pub enable_tls: bool,
    pub delivery: Delivery,
    pub credentials: CredentialMode,
    pub timeout: Option<Duration>,
}

/// Resolve the profile for `code`.
///
/// Fails with [`ProcedureError::UnknownClient`] for identifiers outside the
/// table, and with [`ProcedureError::InvalidOverride`] when the general
/// profile is given an unusable host or port.
pub fn resolve_profile(
    code: i32,
    overrides: &ProfileOverrides,
    sender: &SenderCredentials,
) -> Result<TransportProfile, ProcedureError> {
    let client = ClientId::from_code(code).ok_or(ProcedureError::UnknownClient { code })?;

    if client == ClientId::General {
        return general_profile(overrides, sender);
    }

    let preset = preset(client).ok_or(ProcedureError::UnknownClient { code })?;
    Ok(TransportProfile {
        client,
        host: preset.host.to_string(),
        port: preset.port,
        enable_tls: preset.enable_tls,
        delivery: Delivery::Network,
        credentials: sender.explicit(),
        timeout: None,
    })
}

fn general_profile(
    overrides: &ProfileOverrides,
    sender: &SenderCredentials,
) -> Result<TransportProfile, ProcedureError> {
    let host = overrides.host.trim();
    if host.is_empty() {
        return Err(ProcedureError::InvalidOverride {
            field: "host",
            reason: "host must not be empty".into(),
        });
    }

    let port = u16::try_from(overrides.port)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| ProcedureError::InvalidOverride {
            field: "port",
            reason: format!("{} is not between 1 and 65535", overrides.port),
        })?;

    let credentials = if overrides.use_default_credentials > 0 {
        CredentialMode::Ambient
    } else {
        sender.explicit()
    };

    Ok(TransportProfile {
        client: ClientId::General,
        host: host.to_string(),
        port,
        enable_tls: overrides.enable_ssl > 0,
        delivery: Delivery::Network,
        credentials,
        timeout: Some(GENERAL_SMTP_TIMEOUT),
    })
}
