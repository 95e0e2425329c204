use tracing::{debug, instrument};

use super::Api;
use crate::error::Result;
use crate::model::{EventSummary, Listing, Single};

#[instrument(skip(api))]
pub(crate) async fn get_events(api: &Api<'_>) -> Result<Vec<EventSummary>> {
    let listing: Listing<EventSummary> = api.get_json("events").await?;
    let events = listing.into_vec();
    debug!(count = events.len(), "fetched events");
    Ok(events)
}

#[instrument(skip(api))]
pub(crate) async fn get_event(api: &Api<'_>, event_id: &str) -> Result<EventSummary> {
    let event: Single<EventSummary> = api.get_json(&format!("events/{event_id}")).await?;
    Ok(event.into_inner())
}
