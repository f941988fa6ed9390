//! Ponyracer REST API Client
//!
//! HTTP client for races, bets, boosts and user accounts.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::{GatewayError, GatewayResult, RaceGateway};
use crate::models::{
    Credentials, PonyId, Race, RaceId, RaceStatus, RegistrationRequest, ScoreHistoryEntry, User,
};
use crate::session::Session;

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL of the API (e.g., "https://ponyracer.ninja-squad.com")
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ponyracer.ninja-squad.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// REST client for the Ponyracer API
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    session: Session,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PonyRequest<'a> {
    pony_id: &'a PonyId,
}

impl HttpGateway {
    /// Create a gateway authenticating with the given session
    pub fn new(config: HttpGatewayConfig, session: Session) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(config.base_url));
        }

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `{base}/api/{segments}`, each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Attach the bearer token of the logged-in user, if any
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let message = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 {
            Err(GatewayError::NotFound(url))
        } else {
            Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(GatewayError::from_transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Create an account and log it in
    pub async fn register(&self, request: &RegistrationRequest) -> GatewayResult<User> {
        let user: User = self
            .send_json(self.client.post(self.url(&["users"])).json(request))
            .await?;
        self.remember(&user)?;
        Ok(user)
    }

    /// Authenticate and log the user in
    pub async fn authenticate(&self, credentials: &Credentials) -> GatewayResult<User> {
        let user: User = self
            .send_json(self.client.post(self.url(&["users", "authentication"])).json(credentials))
            .await?;
        self.remember(&user)?;
        Ok(user)
    }

    /// Money history of the logged-in user
    pub async fn score_history(&self) -> GatewayResult<Vec<ScoreHistoryEntry>> {
        self.send_json(self.client.get(self.url(&["money", "history"]))).await
    }

    fn remember(&self, user: &User) -> GatewayResult<()> {
        self.session
            .login(user.clone())
            .map_err(|e| GatewayError::Session(e.to_string()))
    }
}

#[async_trait]
impl RaceGateway for HttpGateway {
    async fn list(&self, status: RaceStatus) -> GatewayResult<Vec<Race>> {
        let request = self
            .client
            .get(self.url(&["races"]))
            .query(&[("status", status.as_str())]);
        let races: Vec<Race> = self.send_json(request).await?;
        tracing::debug!(status = %status, count = races.len(), "Listed races");
        Ok(races)
    }

    async fn get(&self, race_id: &RaceId) -> GatewayResult<Race> {
        self.send_json(self.client.get(self.url(&["races", &race_id.to_string()])))
            .await
    }

    async fn place_bet(&self, race_id: &RaceId, pony_id: &PonyId) -> GatewayResult<Race> {
        let request = self
            .client
            .post(self.url(&["races", &race_id.to_string(), "bets"]))
            .json(&PonyRequest { pony_id });
        let race = self.send_json(request).await?;
        tracing::info!(race_id = %race_id, pony_id = %pony_id, "Bet placed");
        Ok(race)
    }

    async fn cancel_bet(&self, race_id: &RaceId) -> GatewayResult<()> {
        self.send(self.client.delete(self.url(&["races", &race_id.to_string(), "bets"])))
            .await?;
        tracing::info!(race_id = %race_id, "Bet cancelled");
        Ok(())
    }

    async fn boost(&self, race_id: &RaceId, pony_id: &PonyId) -> GatewayResult<()> {
        let request = self
            .client
            .post(self.url(&["races", &race_id.to_string(), "boosts"]))
            .json(&PonyRequest { pony_id });
        self.send(request).await?;
        Ok(())
    }
}
