//! Outbound mail delivery over SMTP via lettre.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::error::ProcedureError;
use crate::mail::profile::{CredentialMode, TransportProfile};
use crate::mail::recipients::RecipientSet;

/// A message ready to hand to a transport. The body is HTML.
#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub from: Mailbox,
    pub recipients: RecipientSet,
    pub subject: String,
    pub html_body: String,
}

impl OutboundMail {
    /// Render into a lettre message: primary in `To`, the rest in `Bcc`.
    pub fn to_message(&self) -> Result<Message, ProcedureError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.recipients.primary.clone())
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_HTML);

        for bcc in &self.recipients.secondary {
            builder = builder.bcc(bcc.clone());
        }

        builder
            .body(self.html_body.clone())
            .map_err(ProcedureError::MessageBuild)
    }
}

/// Something that can put an [`OutboundMail`] on the wire for a profile.
pub trait MailTransport {
    fn deliver(&self, profile: &TransportProfile, mail: &OutboundMail) -> Result<(), ProcedureError>;
}

/// Blocking SMTP transport, one connection per delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    pub fn new() -> Self {
        Self
    }

    /// Build a lettre transport for `profile`.
    ///
    /// TLS-enabled profiles require STARTTLS; the rest talk plain SMTP, as
    /// the port 25 relays expect. Ambient credentials skip AUTH entirely.
    pub fn build_transport(profile: &TransportProfile) -> Result<SmtpTransport, ProcedureError> {
        let builder = if profile.enable_tls {
            SmtpTransport::starttls_relay(&profile.host).map_err(|source| ProcedureError::Smtp {
                host: profile.host.clone(),
                port: profile.port,
                source,
            })?
        } else {
            SmtpTransport::builder_dangerous(&profile.host)
        };

        let mut builder = builder.port(profile.port).timeout(profile.timeout);

        if let CredentialMode::Explicit { username, password } = &profile.credentials {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_owned(),
            ));
        }

        Ok(builder.build())
    }
}

impl MailTransport for SmtpMailer {
    fn deliver(&self, profile: &TransportProfile, mail: &OutboundMail) -> Result<(), ProcedureError> {
        let message = mail.to_message()?;
        let transport = Self::build_transport(profile)?;

        tracing::debug!(
            host = %profile.host,
            port = profile.port,
            tls = profile.enable_tls,
            ambient = profile.credentials.is_ambient(),
            "Connecting to SMTP relay"
        );

        transport
            .send(&message)
            .map_err(|source| ProcedureError::Smtp {
                host: profile.host.clone(),
                port: profile.port,
                source,
            })?;

        tracing::info!(
            "Email sent via {} to {} (+{} bcc)",
            profile.client.name(),
            mail.recipients.primary.email,
            mail.recipients.secondary.len()
        );
        Ok(())
    }
}
