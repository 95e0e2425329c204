use std::future::Future;
use std::pin::Pin;

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{EventSummary, ScanResponse};

/// Boxed future returned by [`CheckinBackend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// The remote collaborators the check-in controller depends on.
///
/// [`ApiClient`] implements this over HTTP; tests substitute an in-memory fake.
pub trait CheckinBackend: Send + Sync {
    /// All events; the controller keeps only today's.
    fn list_events(&self) -> BackendFuture<'_, Vec<EventSummary>>;

    /// One event with fresh ticket counters.
    fn event_detail<'a>(&'a self, event_id: &'a str) -> BackendFuture<'a, EventSummary>;

    /// Redeem `code` against `event_id`. The server alone decides validity.
    fn validate_ticket<'a>(
        &'a self,
        code: &'a str,
        event_id: &'a str,
    ) -> BackendFuture<'a, ScanResponse>;
}

impl CheckinBackend for ApiClient {
    fn list_events(&self) -> BackendFuture<'_, Vec<EventSummary>> {
        Box::pin(self.get_events())
    }

    fn event_detail<'a>(&'a self, event_id: &'a str) -> BackendFuture<'a, EventSummary> {
        Box::pin(self.get_event(event_id))
    }

    fn validate_ticket<'a>(
        &'a self,
        code: &'a str,
        event_id: &'a str,
    ) -> BackendFuture<'a, ScanResponse> {
        Box::pin(ApiClient::validate_ticket(self, code, event_id))
    }
}
