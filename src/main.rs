use clap::{Parser, Subcommand};
use secrecy::SecretString;
use serde::Serialize;

use sqlext::config::HttpConfig;
use sqlext::stage::StageQueryRequest;
use sqlext::{SendEmailRequest, query_process_stage, send_email};

/// Invoke the database procedures from the command line.
#[derive(Parser)]
#[command(name = "sqlext", version, about = "Mail dispatch and folio stage procedures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an e-mail through a configured SMTP client
    SendEmail {
        /// SMTP client: 0 general, 1 gmail, 2 secure-server, 3 exchange, 4 company
        #[arg(long, default_value_t = 0)]
        client: i32,
        /// Relay host (general client only)
        #[arg(long, default_value = "")]
        host: String,
        /// Relay port (general client only)
        #[arg(long, default_value_t = 25)]
        port: i32,
        /// >0 enables TLS (general client only)
        #[arg(long, default_value_t = 0)]
        enable_ssl: i32,
        /// >0 uses ambient credentials (general client only)
        #[arg(long, default_value_t = 0)]
        use_default_credentials: i32,
        /// Sender address
        #[arg(long)]
        from: String,
        /// Sender password
        #[arg(long, env = "SQLEXT_SMTP_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
        /// Comma or semicolon separated recipients
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        subject: String,
        /// HTML body
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Poll a stage service for a folio
    QueryStage {
        /// Stage service URL
        #[arg(long)]
        url: String,
        /// Authorization header value
        #[arg(long, default_value = "")]
        authorization: String,
        /// Folio identifier
        #[arg(long, default_value = "")]
        folio: String,
        /// Trust any TLS certificate (overrides SQLEXT_HTTP_ACCEPT_INVALID_CERTS)
        #[arg(long)]
        accept_invalid_certs: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let status = match cli.command {
        Commands::SendEmail {
            client,
            host,
            port,
            enable_ssl,
            use_default_credentials,
            from,
            password,
            to,
            subject,
            body,
        } => {
            let request = SendEmailRequest {
                client,
                host,
                port,
                enable_ssl,
                use_default_credentials,
                from,
                password: SecretString::from(password),
                to,
                subject,
                body,
            };
            let outcome = send_email(&request);
            print_outcome(&outcome, cli.json, || outcome.message.clone())?;
            outcome.status
        }
        Commands::QueryStage {
            url,
            authorization,
            folio,
            accept_invalid_certs,
        } => {
            let mut config = HttpConfig::from_env();
            config.accept_invalid_certs |= accept_invalid_certs;
            let request = StageQueryRequest {
                service_url: url,
                authorization_header: authorization,
                folio,
            };
            let outcome = query_process_stage(&request, &config);
            print_outcome(&outcome, cli.json, || {
                format!("completed={}\n{}", outcome.is_completed, outcome.message)
            })?;
            outcome.status
        }
    };

    std::process::exit(if status == sqlext::constants::SUCCESS { 0 } else { 1 });
}

fn print_outcome<T, F>(outcome: &T, json: bool, plain: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        println!("{}", plain());
    }
    Ok(())
}
