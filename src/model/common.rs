use chrono::{DateTime, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// A list response. The API returns collections either bare or wrapped in an
/// object keyed by the resource name, e.g. `{ "events": [...] }`.
///
/// Items are decoded one at a time; malformed records are logged and skipped
/// so one bad document does not hide the rest.
#[derive(Debug, Clone)]
pub(crate) struct Listing<T>(Vec<T>);

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Listing<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Bare(Vec<serde_json::Value>),
            Wrapped {
                #[serde(alias = "events", alias = "payments", alias = "categories")]
                data: Vec<serde_json::Value>,
            },
        }

        let raw = match Shape::deserialize(deserializer)? {
            Shape::Bare(items) | Shape::Wrapped { data: items } => items,
        };
        let items = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed list item");
                    None
                }
            })
            .collect();
        Ok(Listing(items))
    }
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single-resource response, bare or wrapped as `{ "event": {...} }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Single<T> {
    Wrapped {
        #[serde(alias = "event")]
        data: T,
    },
    Bare(T),
}

impl<T> Single<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Single::Bare(item) => item,
            Single::Wrapped { data } => data,
        }
    }
}

/// Parse an event date as served by the API.
///
/// Plain `YYYY-MM-DD` dates are taken as-is. Full timestamps are converted to
/// the local calendar date, so "today" comparisons match the operator's clock.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

pub(crate) fn deserialize_event_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised event date: {raw}")))
}

/// Accept a document reference either as a bare id or as an object carrying `_id`.
pub(crate) fn deserialize_ref_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ref {
        Id(String),
        Doc {
            #[serde(rename = "_id", alias = "id")]
            id: String,
        },
    }

    Ok(Option::<Ref>::deserialize(deserializer)?.map(|r| match r {
        Ref::Id(id) | Ref::Doc { id } => id,
    }))
}
