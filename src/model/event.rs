use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::EnumString;
use tracing::warn;

use super::category::CategoryRef;
use super::common::{deserialize_event_date, null_as_default};

/// Cached, read-only view of one event as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "eventName", alias = "title")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_event_date")]
    pub date: NaiveDate,
    #[serde(default, alias = "location", deserialize_with = "null_as_default")]
    pub venue: String,
    /// Scheduled start time, free text as entered in the back office.
    #[serde(default, alias = "startTime", deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    /// Lifecycle status as reported by the server; `None` when absent or unrecognised.
    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub ticket_status: Option<TicketStatus>,
}

/// Capacity and check-in counters for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub maximum_occupancy: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_number_of_players: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub unscanned_tickets: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub successful_payment: u32,
}

impl TicketStatus {
    /// Tickets already redeemed. Never negative, even if the counters disagree.
    pub fn checked_in(&self) -> u32 {
        self.total_number_of_players
            .saturating_sub(self.unscanned_tickets)
    }
}

/// The lifecycle status of an event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
    Postponed,
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<EventStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match EventStatus::from_str(s.trim()) {
        Ok(status) => Some(status),
        Err(_) => {
            warn!(status = %s, "unknown event status");
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Listing;

    #[test]
    fn test_deserialize_backend_event() {
        let json = r#"{
            "_id": "65f0c0ffee",
            "eventName": "City Marathon",
            "date": "2026-10-19",
            "location": "Harbour Front",
            "time": "09:00",
            "category": { "_id": "c1", "name": "Running" },
            "status": "Upcoming",
            "ticketStatus": {
                "maximumOccupancy": 100,
                "totalNumberOfPlayers": 60,
                "unscannedTickets": 10,
                "successfulPayment": 58
            }
        }"#;
        let event: EventSummary = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "65f0c0ffee");
        assert_eq!(event.name, "City Marathon");
        assert_eq!(event.venue, "Harbour Front");
        assert_eq!(event.status, Some(EventStatus::Upcoming));
        let status = event.ticket_status.unwrap();
        assert_eq!(status.maximum_occupancy, 100);
        assert_eq!(status.checked_in(), 50);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{ "_id": "e1", "name": "Pickup Game", "date": "2026-10-19" }"#;
        let event: EventSummary = serde_json::from_str(json).unwrap();
        assert!(event.ticket_status.is_none());
        assert!(event.status.is_none());
        assert!(event.category.is_none());
        assert!(event.venue.is_empty());
    }

    #[test]
    fn test_unknown_status_is_dropped() {
        let json = r#"{ "_id": "e1", "name": "x", "date": "2026-10-19", "status": "rained-out" }"#;
        let event: EventSummary = serde_json::from_str(json).unwrap();
        assert!(event.status.is_none());
    }

    #[test]
    fn test_partial_ticket_status_defaults_to_zero() {
        let status: TicketStatus = serde_json::from_str(r#"{ "unscannedTickets": 4 }"#).unwrap();
        assert_eq!(status.total_number_of_players, 0);
        assert_eq!(status.checked_in(), 0);
    }

    #[test]
    fn test_null_display_fields_and_counters() {
        let json = r#"{
            "_id": "e1",
            "name": "Derby",
            "date": "2026-10-19",
            "location": null,
            "time": null,
            "ticketStatus": { "maximumOccupancy": 100, "unscannedTickets": null }
        }"#;
        let event: EventSummary = serde_json::from_str(json).unwrap();
        assert!(event.venue.is_empty());
        assert!(event.time.is_empty());
        let status = event.ticket_status.unwrap();
        assert_eq!(status.maximum_occupancy, 100);
        assert_eq!(status.unscanned_tickets, 0);
    }

    #[test]
    fn test_bad_event_does_not_hide_good_ones() {
        let json = r#"[
            { "_id": "e1", "name": "Derby", "date": "2026-10-19", "location": null },
            { "_id": "e2", "name": "Final", "date": null },
            { "_id": "e3", "name": "Cup", "date": "someday" },
            { "_id": "e4", "name": "Friendly", "date": "2026-10-19",
              "ticketStatus": { "unscannedTickets": null } }
        ]"#;
        let listing: Listing<EventSummary> = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = listing.into_vec().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["e1", "e4"]);
    }
}
