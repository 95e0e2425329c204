use serde::Serialize;

use crate::model::TicketStatus;

/// Counters shown next to the scanner for the selected event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CheckinStats {
    pub capacity: u32,
    pub registered: u32,
    pub checked_in: u32,
    pub remaining: u32,
    pub paid: u32,
    /// Checked-in tickets as a percentage of capacity, capped at 100.
    pub progress_percent: f64,
}

impl CheckinStats {
    /// Build the view from an event's counters. Missing counters render as zeros.
    pub fn from_ticket_status(status: Option<&TicketStatus>) -> Self {
        let Some(status) = status else {
            return Self::default();
        };
        let checked_in = status.checked_in();
        let progress_percent = if status.maximum_occupancy == 0 {
            0.0
        } else {
            (f64::from(checked_in) / f64::from(status.maximum_occupancy) * 100.0).min(100.0)
        };
        Self {
            capacity: status.maximum_occupancy,
            registered: status.total_number_of_players,
            checked_in,
            remaining: status.unscanned_tickets,
            paid: status.successful_payment,
            progress_percent,
        }
    }
}
