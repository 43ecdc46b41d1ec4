//! Completion detection on a raw stage payload.

use crate::constants::STAGE_COMPLETED_MARKER;

/// True when the payload carries `"situacion":"COMPLETADA"` anywhere.
///
/// Plain substring scan; the payload is never parsed as JSON, so empty or
/// malformed bodies are simply "not completed".
pub fn is_stage_completed(payload: &str) -> bool {
    payload.contains(STAGE_COMPLETED_MARKER)
}

/// Out-parameter encoding: 1 = completed, 0 = not completed.
pub fn completion_flag(completed: bool) -> i32 {
    i32::from(completed)
}
