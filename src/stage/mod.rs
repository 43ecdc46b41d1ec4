//! Folio stage polling: HTTP fetch plus completion detection.

pub mod detector;
pub mod fetcher;

pub use detector::{completion_flag, is_stage_completed};
pub use fetcher::{HttpStageFetcher, StageFetcher, StageQueryRequest};

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub payload: String,
    pub completed: bool,
}

impl StageReport {
    pub fn from_payload(payload: String) -> Self {
        let completed = is_stage_completed(&payload);
        Self { payload, completed }
    }
}
