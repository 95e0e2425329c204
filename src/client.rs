use tracing::instrument;

use crate::api::{self, Api};
use crate::auth::AdminSession;
use crate::config::Config;
use crate::error::{Result, TicketdeskError};
use crate::model::*;

/// The main entry point for talking to the ticketing REST API.
///
/// `ApiClient` wraps a [`reqwest::Client`] and exposes methods to fetch
/// events, payments and categories and to redeem ticket codes.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ticketdesk::Result<()> {
/// use ticketdesk::ApiClient;
///
/// let client = ApiClient::new("http://localhost:5000/api");
/// let events = client.get_events().await?;
/// println!("Found {} events", events.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new client with default HTTP settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure proxies, headers, etc.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: client,
            base_url,
            token: None,
        }
    }

    /// Create a client whose requests are bounded by `config.request_timeout`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TicketdeskError::Http {
                url: config.api_base_url.clone(),
                source: e,
            })?;
        Ok(Self::with_client(http, config.api_base_url.as_str()))
    }

    /// A copy of this client that sends the session's bearer token.
    pub fn authorized(&self, session: &AdminSession) -> Self {
        Self {
            token: Some(session.token().to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api(&self) -> Api<'_> {
        Api {
            http: &self.http,
            base_url: &self.base_url,
            token: self.token.as_deref(),
        }
    }

    /// Fetch every event known to the backend.
    #[instrument(skip(self))]
    pub async fn get_events(&self) -> Result<Vec<EventSummary>> {
        api::events::get_events(&self.api()).await
    }

    /// Fetch one event including its current ticket counters.
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> Result<EventSummary> {
        api::events::get_event(&self.api(), event_id).await
    }

    /// Redeem a decoded ticket code against one event.
    #[instrument(skip(self, code))]
    pub async fn validate_ticket(&self, code: &str, event_id: &str) -> Result<ScanResponse> {
        api::tickets::validate_ticket(&self.api(), code, event_id).await
    }

    /// Fetch all recorded payments.
    #[instrument(skip(self))]
    pub async fn get_payments(&self) -> Result<Vec<Payment>> {
        api::payments::get_payments(&self.api()).await
    }

    /// Fetch all sport categories.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        api::categories::get_categories(&self.api()).await
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        api::auth::login(&self.api(), email, password).await
    }
}
