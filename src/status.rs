//! Which lifecycle status an event is in.
//!
//! The server-provided `status` is authoritative. The date heuristic is only
//! used for events that carry no (recognised) status.

use chrono::NaiveDate;

use crate::model::{EventStatus, EventSummary};

/// Infer a status from the event date alone.
pub fn infer_status(date: NaiveDate, today: NaiveDate) -> EventStatus {
    match date.cmp(&today) {
        std::cmp::Ordering::Less => EventStatus::Completed,
        std::cmp::Ordering::Equal => EventStatus::Ongoing,
        std::cmp::Ordering::Greater => EventStatus::Upcoming,
    }
}

/// The status to display for `event`.
pub fn effective_status(event: &EventSummary, today: NaiveDate) -> EventStatus {
    event
        .status
        .unwrap_or_else(|| infer_status(event.date, today))
}
