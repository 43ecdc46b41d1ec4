//! sqlext: mail dispatch and folio stage polling procedures for a
//! database host.

pub mod config;
pub mod constants;
pub mod error;
pub mod mail;
pub mod outcome;
pub mod procedures;
pub mod stage;
pub mod tls;

pub use outcome::{Fault, ProcedureOutcome, StageOutcome};
pub use procedures::{SendEmailRequest, query_process_stage, send_email};
