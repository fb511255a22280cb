use crate::domain::order::{FetchError, Order, SessionId};
use crate::domain::ports::OrderSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

/// Fetches orders from a running storefront's `GET /checkout/session/{id}`.
pub struct HttpOrderClient {
    base_url: String,
    http: Client,
}

impl HttpOrderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// The session id is pushed as one path segment, so it is percent-encoded.
    fn order_url(&self, session_id: &SessionId) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["checkout", "session", session_id.as_str()]);
        Some(url)
    }
}

#[async_trait]
impl OrderSource for HttpOrderClient {
    async fn fetch_order_by_session(&self, session_id: &SessionId) -> Result<Order, FetchError> {
        let url = self.order_url(session_id).ok_or_else(|| {
            warn!(base_url = %self.base_url, "base url cannot carry a path");
            FetchError::Api
        })?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "order request failed");
                FetchError::Api
            })?;

        match response.status() {
            StatusCode::OK => {
                let envelope: OrderEnvelope = response.json().await.map_err(|e| {
                    warn!(error = %e, "order response could not be decoded");
                    FetchError::Api
                })?;
                Ok(envelope.order)
            }
            StatusCode::NOT_FOUND => {
                debug!(%session_id, "order not recorded yet");
                Err(FetchError::NotFound)
            }
            status => {
                warn!(%status, "unexpected order response");
                Err(FetchError::Api)
            }
        }
    }
}
