//! Process-wide constants shared by both procedures.

use std::time::Duration;

/// Status code returned when a procedure completes.
pub const SUCCESS: i32 = 0;
/// Status code returned when a procedure fails for any reason.
pub const FAILURE: i32 = -1;

pub const MSG_SUCCESSFUL_EXECUTION: &str = "Successful execution";

/// Send timeout applied to the general (caller-configured) SMTP profile.
pub const GENERAL_SMTP_TIMEOUT: Duration = Duration::from_secs(300); // 5 minutes

/// Fragment whose presence marks a folio stage as finished.
pub const STAGE_COMPLETED_MARKER: &str = r#""situacion":"COMPLETADA""#;

pub const JSON_MEDIA_TYPE: &str = "application/json";
