//! The two database procedures.
//!
//! Each entry point takes scalar arguments, runs its pipeline to completion
//! and returns an outcome value. No error escapes: anything that goes wrong
//! is rendered into the outcome's message with status `-1`.

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::error::ProcedureError;
use crate::mail::profile::{ProfileOverrides, SenderCredentials, resolve_profile};
use crate::mail::recipients::{parse_mailbox, partition_recipients};
use crate::mail::transport::{MailTransport, OutboundMail, SmtpMailer};
use crate::outcome::{Fault, ProcedureOutcome, StageOutcome};
use crate::stage::StageReport;
use crate::stage::fetcher::{HttpStageFetcher, StageFetcher, StageQueryRequest};
use crate::tls;

/// Arguments of the e-mail procedure, in calling order.
#[derive(Debug)]
pub struct SendEmailRequest {
    /// SMTP client identifier (0 = general, 1..=4 presets).
    pub client: i32,
    /// Only used by the general profile.
    pub host: String,
    pub port: i32,
    /// `> 0` enables TLS on the general profile.
    pub enable_ssl: i32,
    /// `> 0` uses ambient credentials on the general profile.
    pub use_default_credentials: i32,
    pub from: String,
    pub password: SecretString,
    /// Comma or semicolon separated recipient list.
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

impl SendEmailRequest {
    fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            host: self.host.clone(),
            port: self.port,
            enable_ssl: self.enable_ssl,
            use_default_credentials: self.use_default_credentials,
        }
    }

    fn sender(&self) -> SenderCredentials {
        SenderCredentials::new(self.from.clone(), self.password.expose_secret().to_owned())
    }
}

/// Send an e-mail over SMTP.
pub fn send_email(request: &SendEmailRequest) -> ProcedureOutcome {
    tls::install_crypto_provider();
    send_email_with(&SmtpMailer::new(), request)
}

/// Send an e-mail through the given transport.
pub fn send_email_with(transport: &dyn MailTransport, request: &SendEmailRequest) -> ProcedureOutcome {
    let call_id = Uuid::new_v4();
    let span = tracing::info_span!("send_email", %call_id, client = request.client);
    let _guard = span.enter();

    let result = dispatch(transport, request);
    if let Err(e) = &result {
        tracing::error!("Email dispatch failed: {e}");
    }
    ProcedureOutcome::from_result(result)
}

fn dispatch(transport: &dyn MailTransport, request: &SendEmailRequest) -> Result<(), ProcedureError> {
    let from = parse_mailbox(request.from.trim())?;
    let recipients = partition_recipients(&request.to)?;
    let profile = resolve_profile(request.client, &request.overrides(), &request.sender())?;

    tracing::debug!(
        client = profile.client.name(),
        host = %profile.host,
        recipients = recipients.recipient_count(),
        "Resolved transport profile"
    );

    let mail = OutboundMail {
        from,
        recipients,
        subject: request.subject.clone(),
        html_body: request.body.clone(),
    };
    transport.deliver(&profile, &mail)
}

/// Poll the stage service for a folio.
pub fn query_process_stage(request: &StageQueryRequest, config: &HttpConfig) -> StageOutcome {
    tls::install_crypto_provider();

    let fetcher = config
        .validate()
        .map_err(ProcedureError::from)
        .and_then(|()| HttpStageFetcher::new(config));

    match fetcher {
        Ok(fetcher) => query_process_stage_with(&fetcher, request),
        Err(e) => {
            tracing::error!(folio = %request.folio, "Stage query setup failed: {e}");
            StageOutcome::failure(&Fault::from_error(&e))
        }
    }
}

/// Poll the stage service through the given fetcher.
pub fn query_process_stage_with(fetcher: &dyn StageFetcher, request: &StageQueryRequest) -> StageOutcome {
    let call_id = Uuid::new_v4();
    let span = tracing::info_span!("query_process_stage", %call_id, folio = %request.folio);
    let _guard = span.enter();

    let result = fetcher.fetch(request).map(StageReport::from_payload);
    match &result {
        Ok(report) => tracing::info!(completed = report.completed, "Stage queried"),
        Err(e) => tracing::error!("Stage query failed: {e}"),
    }
    StageOutcome::from_result(result)
}
