//! Back-office logic for a sports-event ticketing site: a typed client for
//! the ticketing REST API, the QR check-in scanner, the admin session and the
//! dashboard aggregates.

pub mod auth;
pub mod checkin;
mod client;
pub mod config;
pub mod dashboard;
mod error;
pub mod model;
pub mod reader;
pub mod status;

pub(crate) mod api;

pub use auth::AdminSession;
pub use checkin::{CheckinController, CheckinHandle, CheckinStats, Phase, ScanSession};
pub use client::ApiClient;
pub use config::Config;
pub use error::{CameraError, Result, TicketdeskError};
pub use model::*;
