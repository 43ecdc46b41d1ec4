//! Procedure outcomes: the `(status, message)` contract seen by the database.
//!
//! Every failure is flattened into a [`Fault`] and rendered as
//!
//! ```text
//! ==Exception:==
//!  Source: <source>
//!  Message: <message>
//! ```
//!
//! with an `===InnerException==` block appended when the failure has a
//! chained cause. Only the first inner level is rendered.

use std::error::Error as StdError;

use serde::Serialize;

use crate::constants::{FAILURE, MSG_SUCCESSFUL_EXECUTION, SUCCESS};
use crate::error::ProcedureError;
use crate::stage::{StageReport, completion_flag};

/// A captured failure: where it came from, what it said, and its cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub source: String,
    pub message: String,
    pub inner: Option<Box<Fault>>,
}

impl Fault {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            inner: None,
        }
    }

    pub fn with_inner(mut self, inner: Fault) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    pub fn from_error(err: &ProcedureError) -> Self {
        let fault = Self::new(err.origin(), err.to_string());
        match err.source() {
            Some(cause) => fault.with_inner(Self::new(
                err.cause_origin().unwrap_or(err.origin()),
                cause.to_string(),
            )),
            None => fault,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "==Exception:==\n Source: {}\n Message: {}",
            self.source, self.message
        );
        if let Some(inner) = &self.inner {
            out.push_str(&format!(
                "\n ===InnerException==\n Source: {}\n Message: {}",
                inner.source, inner.message
            ));
        }
        out
    }
}

/// Result of the e-mail procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureOutcome {
    pub status: i32,
    pub message: String,
}

impl ProcedureOutcome {
    pub fn success() -> Self {
        Self {
            status: SUCCESS,
            message: MSG_SUCCESSFUL_EXECUTION.to_string(),
        }
    }

    pub fn failure(fault: &Fault) -> Self {
        Self {
            status: FAILURE,
            message: fault.render(),
        }
    }

    pub fn from_result(result: Result<(), ProcedureError>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self::failure(&Fault::from_error(&e)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }
}

/// Result of the stage query procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub status: i32,
    /// 1 when the stage is completed, otherwise 0 (always 0 on failure).
    pub is_completed: i32,
    /// Raw payload on success, rendered fault on failure.
    pub message: String,
}

impl StageOutcome {
    pub fn success(report: StageReport) -> Self {
        Self {
            status: SUCCESS,
            is_completed: completion_flag(report.completed),
            message: report.payload,
        }
    }

    pub fn failure(fault: &Fault) -> Self {
        Self {
            status: FAILURE,
            is_completed: 0,
            message: fault.render(),
        }
    }

    pub fn from_result(result: Result<StageReport, ProcedureError>) -> Self {
        match result {
            Ok(report) => Self::success(report),
            Err(e) => Self::failure(&Fault::from_error(&e)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }
}
