pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod events;
pub(crate) mod payments;
pub(crate) mod tickets;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TicketdeskError};

/// Borrowed request context: the shared HTTP client, the API root and the
/// bearer token of the signed-in admin, if any.
#[derive(Clone, Copy)]
pub(crate) struct Api<'a> {
    pub http: &'a reqwest::Client,
    pub base_url: &'a str,
    pub token: Option<&'a str>,
}

impl Api<'_> {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON resource.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url, "GET");
        let request = self.authorize(self.http.get(&url));
        read_json(&url, request).await
    }

    /// POST a JSON body and decode the JSON reply.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url, "POST");
        let request = self.authorize(self.http.post(&url).json(body));
        read_json(&url, request).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: Option<String>,
}

/// Extract the `message` (or `error`) field from an error response body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

async fn read_json<T: DeserializeOwned>(url: &str, request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(|e| TicketdeskError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| TicketdeskError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })?;

    if !status.is_success() {
        let message = error_message(&body);
        debug!(url, %status, ?message, "request rejected");
        return Err(TicketdeskError::UnexpectedStatus {
            url: url.to_owned(),
            status,
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| TicketdeskError::Decode {
        url: url.to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_paths() {
        let http = reqwest::Client::new();
        let api = Api {
            http: &http,
            base_url: "http://localhost:5000/api",
            token: None,
        };
        assert_eq!(api.url("/events/e1"), "http://localhost:5000/api/events/e1");
        assert_eq!(api.url("events"), "http://localhost:5000/api/events");
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message(r#"{ "message": "Ticket already scanned" }"#).as_deref(),
            Some("Ticket already scanned")
        );
        assert_eq!(
            error_message(r#"{ "error": "Invalid event" }"#).as_deref(),
            Some("Invalid event")
        );
        assert_eq!(error_message("<html>502 Bad Gateway</html>"), None);
        assert_eq!(error_message(r#"{ "message": "" }"#), None);
    }
}
