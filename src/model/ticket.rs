use serde::{Deserialize, Serialize};

/// The exact message the backend sends when a ticket was redeemed.
pub const TICKET_SCANNED_MESSAGE: &str = "Ticket scanned successfully";

/// Body submitted to redeem one decoded ticket code against one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest<'a> {
    pub qr_code: &'a str,
    pub event_id: &'a str,
}

/// Outcome of a ticket validation as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: Option<bool>,
}

impl ScanResponse {
    /// Whether the ticket was redeemed. Only the exact success message counts;
    /// the `success` flag is not consistently set by the backend.
    pub fn is_redeemed(&self) -> bool {
        self.message == TICKET_SCANNED_MESSAGE
    }
}
