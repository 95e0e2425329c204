use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::EnumString;

use super::common::deserialize_ref_id;

/// One checkout payment as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Amount in major currency units.
    #[serde(default)]
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_payment_status")]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_ref_id")]
    pub event: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentStatus {
    Succeeded,
    Pending,
    Failed,
    Refunded,
    #[default]
    #[strum(disabled)]
    Unknown,
}

fn deserialize_payment_status<'de, D>(deserializer: D) -> Result<PaymentStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let status = match raw.trim() {
        // Stripe reports completed checkouts as "paid" or "complete".
        "paid" | "complete" | "completed" => PaymentStatus::Succeeded,
        other => PaymentStatus::from_str(other).unwrap_or_default(),
    };
    Ok(status)
}
