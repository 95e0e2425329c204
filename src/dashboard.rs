//! Aggregates shown on the admin dashboard.
//!
//! Every function here is pure: borrowed inputs in, owned view models out.

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use crate::model::{Category, CategoryRef, EventStatus, EventSummary, Payment, PaymentStatus, TicketStatus};
use crate::status::effective_status;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Ticket counters summed over many events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TicketTotals {
    pub capacity: u64,
    pub registered: u64,
    pub checked_in: u64,
    pub remaining: u64,
    pub paid: u64,
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_events: usize,
    pub upcoming_events: usize,
    pub total_revenue: f64,
    pub succeeded_payments: usize,
    pub tickets: TicketTotals,
    /// Mean participation rate over events that have a capacity.
    pub average_participation: f64,
}

impl DashboardSummary {
    pub fn build(events: &[EventSummary], payments: &[Payment], today: NaiveDate) -> Self {
        let succeeded: Vec<&Payment> = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Succeeded)
            .collect();

        let rates: Vec<f64> = events
            .iter()
            .filter_map(|e| e.ticket_status.as_ref())
            .filter(|s| s.maximum_occupancy > 0)
            .map(participation_rate)
            .collect();
        let average_participation = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };

        Self {
            total_events: events.len(),
            upcoming_events: events
                .iter()
                .filter(|e| effective_status(e, today) == EventStatus::Upcoming)
                .count(),
            total_revenue: succeeded.iter().map(|p| p.amount).sum(),
            succeeded_payments: succeeded.len(),
            tickets: merge_ticket_status(events),
            average_participation,
        }
    }
}

/// Events that take place on `date`.
pub fn events_on(events: &[EventSummary], date: NaiveDate) -> Vec<EventSummary> {
    events.iter().filter(|e| e.date == date).cloned().collect()
}

/// Number of events per month (January first) in `year`.
pub fn events_by_month(events: &[EventSummary], year: i32) -> [u32; 12] {
    let mut buckets = [0; 12];
    for event in events.iter().filter(|e| e.date.year() == year) {
        buckets[event.date.month0() as usize] += 1;
    }
    buckets
}

/// Succeeded payment volume per month (January first) in `year`.
pub fn revenue_by_month(payments: &[Payment], year: i32) -> [f64; 12] {
    let mut buckets = [0.0; 12];
    for payment in payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Succeeded && p.created_at.year() == year)
    {
        buckets[payment.created_at.month0() as usize] += payment.amount;
    }
    buckets
}

/// Registered players as a percentage of capacity, capped at 100.
pub fn participation_rate(status: &TicketStatus) -> f64 {
    if status.maximum_occupancy == 0 {
        return 0.0;
    }
    let rate = f64::from(status.total_number_of_players) / f64::from(status.maximum_occupancy) * 100.0;
    rate.min(100.0)
}

/// Sum the ticket counters of all events; events without counters add nothing.
pub fn merge_ticket_status(events: &[EventSummary]) -> TicketTotals {
    events
        .iter()
        .filter_map(|e| e.ticket_status.as_ref())
        .fold(TicketTotals::default(), |acc, s| TicketTotals {
            capacity: acc.capacity + u64::from(s.maximum_occupancy),
            registered: acc.registered + u64::from(s.total_number_of_players),
            checked_in: acc.checked_in + u64::from(s.checked_in()),
            remaining: acc.remaining + u64::from(s.unscanned_tickets),
            paid: acc.paid + u64::from(s.successful_payment),
        })
}

/// Display name for an event's category.
pub fn category_name(category: Option<&CategoryRef>, categories: &[Category]) -> String {
    let Some(category) = category else {
        return UNCATEGORIZED.to_string();
    };
    if let Some(name) = category.name() {
        return name.to_string();
    }
    categories
        .iter()
        .find(|c| c.id == category.id())
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Event count per category name, largest first, ties by name.
pub fn events_per_category(events: &[EventSummary], categories: &[Category]) -> Vec<(String, usize)> {
    events
        .iter()
        .map(|e| category_name(e.category.as_ref(), categories))
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// Criteria for the events table. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub category_id: Option<String>,
    pub search: Option<String>,
}

pub fn filter_events<'a>(
    events: &'a [EventSummary],
    filter: &EventFilter,
    today: NaiveDate,
) -> Vec<&'a EventSummary> {
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    events
        .iter()
        .filter(|e| filter.status.map_or(true, |s| effective_status(e, today) == s))
        .filter(|e| {
            filter.category_id.as_deref().map_or(true, |id| {
                e.category.as_ref().is_some_and(|c| c.id() == id)
            })
        })
        .filter(|e| {
            needle.as_deref().map_or(true, |n| {
                e.name.to_lowercase().contains(n) || e.venue.to_lowercase().contains(n)
            })
        })
        .collect()
}

pub fn filter_payments(payments: &[Payment], status: Option<PaymentStatus>) -> Vec<&Payment> {
    payments
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect()
}
