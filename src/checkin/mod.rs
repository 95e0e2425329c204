//! The ticket check-in scanner.
//!
//! [`reduce`] is the state machine, [`CheckinController`] runs it against a
//! [`CheckinBackend`] and a [`CodeReader`](crate::reader::CodeReader).

mod backend;
mod controller;
mod reducer;
mod session;
mod stats;

pub use backend::{BackendFuture, CheckinBackend};
pub use controller::{CheckinController, CheckinHandle};
pub use reducer::{reduce, Action, Effect, ScanOutcome};
pub use session::{Phase, ScanSession};
pub use stats::CheckinStats;

pub const CAMERA_DENIED_MESSAGE: &str = "Camera permission denied. Please enable camera access.";
pub const NO_EVENT_MESSAGE: &str = "Please select an event first";
pub const GENERIC_SCAN_ERROR: &str = "Error scanning QR code";
pub const EVENTS_LOAD_ERROR: &str = "Failed to load today's events";
