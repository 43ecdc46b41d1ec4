//! Integration tests for the two procedures.
//!
//! Mail tests use a recording transport in place of SMTP, except for one that
//! drives lettre against a closed local port. Stage tests run a
//! real Axum server on a random port (on its own Tokio runtime thread) and hit
//! it with the blocking reqwest fetcher.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::routing::get;
use pretty_assertions::assert_eq;
use secrecy::SecretString;

use sqlext::config::HttpConfig;
use sqlext::error::ProcedureError;
use sqlext::mail::{ClientId, MailTransport, OutboundMail, TransportProfile};
use sqlext::stage::{StageFetcher, StageQueryRequest};
use sqlext::{SendEmailRequest, query_process_stage, procedures};

const TOKEN: &str = "Bearer token-123";

/// What the stub transport saw for one delivery.
#[derive(Debug, Clone, PartialEq)]
struct Delivery {
    client: ClientId,
    host: String,
    port: u16,
    primary: String,
    secondary: Vec<String>,
}

#[derive(Default)]
struct StubTransport {
    deliveries: Mutex<Vec<Delivery>>,
}

impl StubTransport {
    fn seen(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl MailTransport for StubTransport {
    fn deliver(&self, profile: &TransportProfile, mail: &OutboundMail) -> Result<(), ProcedureError> {
        // Must still render as a real message.
        mail.to_message()?;
        self.deliveries.lock().unwrap().push(Delivery {
            client: profile.client,
            host: profile.host.clone(),
            port: profile.port,
            primary: mail.recipients.primary.email.to_string(),
            secondary: mail
                .recipients
                .secondary
                .iter()
                .map(|m| m.email.to_string())
                .collect(),
        });
        Ok(())
    }
}

fn email_request(client: i32, to: &str) -> SendEmailRequest {
    SendEmailRequest {
        client,
        host: "ignored.example.com".into(),
        port: 2525,
        enable_ssl: 0,
        use_default_credentials: 0,
        from: "robot@company.com".into(),
        password: SecretString::from("app-password".to_string()),
        to: to.into(),
        subject: "Folio F-100".into(),
        body: "<h1>Done</h1>".into(),
    }
}

// ── Dispatch-Email ──────────────────────────────────────────────

#[test]
fn gmail_dispatch_end_to_end() {
    let transport = StubTransport::default();
    let outcome = procedures::send_email_with(&transport, &email_request(1, "r1@x.com,r2@x.com"));

    assert_eq!(outcome.status, 0);
    assert_eq!(outcome.message, "Successful execution");
    assert_eq!(
        transport.seen(),
        vec![Delivery {
            client: ClientId::Gmail,
            host: "smtp.gmail.com".into(),
            port: 587,
            primary: "r1@x.com".into(),
            secondary: vec!["r2@x.com".into()],
        }]
    );
}

#[test]
fn general_dispatch_uses_caller_host() {
    let transport = StubTransport::default();
    let mut request = email_request(0, "a@x.com;b@x.com;a@x.com");
    request.host = "smtp.internal.lan".into();
    request.use_default_credentials = 1;

    let outcome = procedures::send_email_with(&transport, &request);
    assert!(outcome.is_success());

    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].host, "smtp.internal.lan");
    assert_eq!(seen[0].port, 2525);
    assert_eq!(seen[0].secondary, vec!["b@x.com".to_string()]);
}

#[test]
fn unknown_client_never_reaches_transport() {
    let transport = StubTransport::default();
    let outcome = procedures::send_email_with(&transport, &email_request(9, "a@x.com"));

    assert_eq!(outcome.status, -1);
    assert_eq!(
        outcome.message,
        "==Exception:==\n Source: sqlext::profile\n Message: Unknown SMTP client identifier: 9"
    );
    assert!(transport.seen().is_empty());
}

#[test]
fn malformed_recipient_reports_inner_cause() {
    let transport = StubTransport::default();
    let outcome = procedures::send_email_with(&transport, &email_request(2, "a@x.com,bad address"));

    assert_eq!(outcome.status, -1);
    assert!(outcome.message.starts_with("==Exception:==\n Source: sqlext::recipients\n Message: "));
    assert!(outcome.message.contains("'bad address'"));
    assert!(outcome.message.contains("\n ===InnerException==\n Source: lettre\n Message: "));
    assert!(transport.seen().is_empty());
}

#[test]
fn empty_recipient_list_fails() {
    let transport = StubTransport::default();
    let outcome = procedures::send_email_with(&transport, &email_request(1, ";;"));
    assert_eq!(outcome.status, -1);
    assert!(outcome.message.ends_with("Message: A recipient must be specified"));
}

#[test]
fn same_failure_formats_identically() {
    let transport = StubTransport::default();
    let first = procedures::send_email_with(&transport, &email_request(1, "nope"));
    let second = procedures::send_email_with(&transport, &email_request(1, "nope"));
    assert_eq!(first, second);
}

/// A loopback port nothing listens on.
fn closed_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn smtp_connection_refused_chains_lettre_cause() {
    let port = closed_port();
    let mut request = email_request(0, "r1@x.com,r2@x.com");
    request.host = "127.0.0.1".into();
    request.port = i32::from(port);

    let outcome = sqlext::send_email(&request);

    assert_eq!(outcome.status, -1);
    assert!(outcome.message.starts_with(&format!(
        "==Exception:==\n Source: sqlext::mail\n Message: Failure sending mail through 127.0.0.1:{port}"
    )));
    assert!(
        outcome
            .message
            .contains("\n ===InnerException==\n Source: lettre\n Message: Connection error")
    );
}

// ── Query-Stage (stub fetcher) ──────────────────────────────────

struct StubFetcher(Result<&'static str, u16>);

impl StageFetcher for StubFetcher {
    fn fetch(&self, request: &StageQueryRequest) -> Result<String, ProcedureError> {
        match self.0 {
            Ok(body) => Ok(body.to_string()),
            Err(status) => Err(ProcedureError::HttpStatus {
                url: request.service_url.clone(),
                status,
                reason: "Not Found".into(),
            }),
        }
    }
}

fn stage_request(url: &str, auth: &str, folio: &str) -> StageQueryRequest {
    StageQueryRequest {
        service_url: url.into(),
        authorization_header: auth.into(),
        folio: folio.into(),
    }
}

#[test]
fn stub_completed_and_pending() {
    let request = stage_request("https://stage.example.com/f/1", "", "1");

    let done = procedures::query_process_stage_with(
        &StubFetcher(Ok(r#"{"situacion":"COMPLETADA"}"#)),
        &request,
    );
    assert_eq!((done.status, done.is_completed), (0, 1));
    assert_eq!(done.message, r#"{"situacion":"COMPLETADA"}"#);

    let pending = procedures::query_process_stage_with(
        &StubFetcher(Ok(r#"{"situacion":"EN_PROCESO"}"#)),
        &request,
    );
    assert_eq!((pending.status, pending.is_completed), (0, 0));

    let empty = procedures::query_process_stage_with(&StubFetcher(Ok("")), &request);
    assert_eq!((empty.status, empty.is_completed, empty.message.as_str()), (0, 0, ""));
}

#[test]
fn stub_failure_is_formatted() {
    let request = stage_request("https://stage.example.com/f/1", "", "1");
    let outcome = procedures::query_process_stage_with(&StubFetcher(Err(404)), &request);
    assert_eq!((outcome.status, outcome.is_completed), (-1, 0));
    assert_eq!(
        outcome.message,
        "==Exception:==\n Source: sqlext::stage\n Message: The remote server returned an error: (404) Not Found"
    );
}

// ── Query-Stage (real HTTP) ─────────────────────────────────────

async fn stage_handler(Path(folio): Path<String>, headers: HeaderMap) -> (StatusCode, String) {
    let header = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    if header(AUTHORIZATION) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, String::new());
    }
    let accepts_json = header(ACCEPT) == Some("application/json");
    let situacion = if folio == "F-100" { "COMPLETADA" } else { "EN_PROCESO" };
    (
        StatusCode::OK,
        format!(r#"{{"folio":"{folio}","situacion":"{situacion}","json":{accepts_json}}}"#),
    )
}

/// Start the stage server on its own runtime thread and return its base URL.
fn start_stage_server() -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let app = Router::new().route("/stage/{folio}", get(stage_handler));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    format!("http://{addr}")
}

#[test]
fn http_completed_folio() {
    let base = start_stage_server();
    let request = stage_request(&format!("{base}/stage/F-100"), TOKEN, "F-100");

    let outcome = query_process_stage(&request, &HttpConfig::default());
    assert_eq!((outcome.status, outcome.is_completed), (0, 1));
    assert_eq!(
        outcome.message,
        r#"{"folio":"F-100","situacion":"COMPLETADA","json":true}"#
    );
}

#[test]
fn http_pending_folio() {
    let base = start_stage_server();
    let request = stage_request(&format!("{base}/stage/F-200"), TOKEN, "F-200");

    let outcome = query_process_stage(&request, &HttpConfig::default());
    assert_eq!((outcome.status, outcome.is_completed), (0, 0));
    assert!(outcome.message.contains(r#""situacion":"EN_PROCESO""#));
}

#[test]
fn http_missing_authorization_is_failure() {
    let base = start_stage_server();
    let request = stage_request(&format!("{base}/stage/F-100"), "", "F-100");

    let outcome = query_process_stage(&request, &HttpConfig::default());
    assert_eq!((outcome.status, outcome.is_completed), (-1, 0));
    assert_eq!(
        outcome.message,
        "==Exception:==\n Source: sqlext::stage\n Message: The remote server returned an error: (401) Unauthorized"
    );
}

#[test]
fn http_unreachable_service_chains_cause() {
    let port = closed_port();
    let request = stage_request(&format!("http://127.0.0.1:{port}/stage/F-1"), "", "F-1");

    let config = HttpConfig {
        timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    };
    let outcome = query_process_stage(&request, &config);
    assert_eq!((outcome.status, outcome.is_completed), (-1, 0));
    assert!(outcome.message.starts_with("==Exception:==\n Source: sqlext::stage\n Message: Request to "));
    assert!(outcome.message.contains("\n ===InnerException==\n Source: reqwest\n Message: "));
}
