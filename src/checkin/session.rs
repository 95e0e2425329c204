use serde::Serialize;

use super::stats::CheckinStats;
use crate::model::EventSummary;

/// Where the scanner is in its capture → validate → feedback cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// No reader session.
    #[default]
    Idle,
    /// Reader active, accepting decodes.
    Scanning,
    /// A code was captured; the reader is paused and a request is outstanding.
    Validating,
    /// A result is on screen; the reader is still paused.
    Feedback,
}

/// Client-local state of one check-in screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSession {
    pub today_events: Vec<EventSummary>,
    pub selected_event: Option<EventSummary>,
    pub phase: Phase,
    pub last_result_message: Option<String>,
    pub last_error: Option<String>,
    pub in_flight: bool,
    /// Bumped whenever a reader session starts or stops. Work tagged with an
    /// older epoch is discarded when it completes.
    pub epoch: u64,
}

impl ScanSession {
    pub fn scanning_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn selected_event_id(&self) -> Option<&str> {
        self.selected_event.as_ref().map(|e| e.id.as_str())
    }

    pub fn stats(&self) -> CheckinStats {
        CheckinStats::from_ticket_status(
            self.selected_event
                .as_ref()
                .and_then(|e| e.ticket_status.as_ref()),
        )
    }

    pub(crate) fn is_today(&self, event_id: &str) -> bool {
        self.today_events.iter().any(|e| e.id == event_id)
    }

    pub(crate) fn clear_feedback(&mut self) {
        self.last_result_message = None;
        self.last_error = None;
    }
}
