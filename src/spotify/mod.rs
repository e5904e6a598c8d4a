//! # Spotify Integration Module
//!
//! This module is the integration layer between genrecli and the Spotify Web
//! API. It covers authorization (interactive PKCE login and token refresh), the
//! read-only endpoints the genre report needs, and a single generic paginator
//! shared by every listing endpoint.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Collector)
//!          ↓
//! SpotifyClient (typed endpoints, Paginator)
//!          ↓
//! Transport (HttpTransport: reqwest + RetryConfig)
//!          ↓
//! Spotify Web API
//! ```
//!
//! [`SpotifyClient`] is generic over a [`Transport`] that performs one
//! authenticated `GET` and returns the JSON body. Production code uses
//! [`HttpTransport`]; tests plug in an in-memory transport serving canned pages.
//!
//! ## API Coverage
//!
//! - `GET /me` - current user
//! - `GET /me/playlists` - playlists of the current user (paged)
//! - `GET /users/{user_id}/playlists` - public playlists of a user (paged)
//! - `GET /playlists/{playlist_id}` - playlist details, used to resolve the owner
//! - `GET /playlists/{playlist_id}/tracks` - playlist items (paged)
//! - `GET /me/tracks` - saved "Liked Songs" (paged)
//! - `GET /artists/{id}` - artist with its genre tags
//! - `POST /api/token` - code exchange and refresh, see [`auth`]
//!
//! ## Error Handling
//!
//! Every request made through [`HttpTransport`] is retried on HTTP 429, 5xx and
//! connect/timeout failures according to [`RetryConfig`], honouring the
//! `Retry-After` header. Any other non-success answer becomes
//! [`Error::Api`](crate::Error::Api) carrying the status and the message
//! Spotify sent.

pub mod auth;
pub mod pagination;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::{sync::RwLock, time::sleep};

use crate::{
    Error, Res,
    config::Config,
    management::{Session, SessionSource},
    types::{Artist, Playlist, TrackItem, User},
    warning,
};

pub use pagination::Paginator;
pub use retry::RetryConfig;

/// Page size used for every listing endpoint.
pub const PAGE_SIZE: u32 = 50;

/// Performs one authenticated `GET` against the Web API.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, access_token: &str) -> Res<Value>;
}

/// reqwest based transport with bounded retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    retry: RetryConfig,
}

impl HttpTransport {
    pub fn new(retry: RetryConfig) -> Self {
        Self {
            client: Client::new(),
            retry,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, access_token: &str) -> Res<Value> {
        let mut attempt = 0;

        loop {
            let response = match self.client.get(url).bearer_auth(access_token).send().await {
                Ok(resp) => resp,
                Err(err)
                    if (err.is_connect() || err.is_timeout())
                        && attempt < self.retry.max_retries =>
                {
                    sleep(self.retry.delay(attempt, None)).await;
                    attempt += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<Value>().await?);
            }

            if self.retry.should_retry(status, attempt) {
                let retry_after = retry::retry_after_secs(response.headers());
                if retry_after.is_some_and(|secs| secs > self.retry.max_delay) {
                    warning!(
                        "Spotify asks to wait {} seconds, retrying after {} seconds instead.",
                        retry_after.unwrap_or_default(),
                        self.retry.max_delay
                    );
                }
                sleep(self.retry.delay(attempt, retry_after)).await;
                attempt += 1;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
    }
}

/// Pulls the human readable message out of a Spotify error body.
///
/// Web API errors look like `{"error": {"status": 404, "message": "..."}}`,
/// the accounts service answers `{"error": "...", "error_description": "..."}`.
pub fn api_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json["error"]["message"].as_str() {
            return message.to_string();
        }
        if let Some(description) = json["error_description"].as_str() {
            return description.to_string();
        }
        if let Some(error) = json["error"].as_str() {
            return error.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Typed access to the Web API endpoints used by genrecli.
///
/// The client starts from one [`Session`]. With a [`SessionSource`] attached
/// (see [`with_session_source`](SpotifyClient::with_session_source)) it keeps
/// that session alive for runs longer than the token lifetime:
///
/// - before a request, an access token past its `expires_at` is replaced with
///   [`SessionSource::current`]
/// - a request answered with HTTP 401 is sent once more with a token from
///   [`SessionSource::renew`]
///
/// A 401 that survives the renewal, or any 401 without a source, is returned
/// as [`Error::Api`] with status 401, which
/// [`Error::is_auth_failure`](crate::Error::is_auth_failure) reports as fatal.
pub struct SpotifyClient<T: Transport = HttpTransport> {
    transport: T,
    api_url: String,
    session: RwLock<Session>,
    source: Option<Arc<dyn SessionSource>>,
}

impl SpotifyClient<HttpTransport> {
    pub fn new(config: &Config, session: &Session) -> Self {
        let transport = HttpTransport::new(RetryConfig::with_max_retries(config.max_retries));
        Self::with_transport(transport, &config.api_url, session)
    }
}

impl<T: Transport> SpotifyClient<T> {
    pub fn with_transport(transport: T, api_url: &str, session: &Session) -> Self {
        Self {
            transport,
            api_url: api_url.trim_end_matches('/').to_string(),
            session: RwLock::new(session.clone()),
            source: None,
        }
    }

    /// Lets the client replace an expired or rejected access token.
    pub fn with_session_source(mut self, source: Arc<dyn SessionSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub(crate) async fn get<D: DeserializeOwned>(&self, url: &str) -> Res<D> {
        let token = self.access_token().await?;

        let json = match (self.transport.get_json(url, &token).await, &self.source) {
            (Err(Error::Api { status: 401, .. }), Some(source)) => {
                let token = self.replace_session(source.renew().await?).await;
                self.transport.get_json(url, &token).await?
            }
            (result, _) => result?,
        };

        Ok(serde_json::from_value(json)?)
    }

    async fn access_token(&self) -> Res<String> {
        let session = self.session.read().await.clone();

        match &self.source {
            Some(source) if !session.is_valid_at(Utc::now().timestamp()) => {
                Ok(self.replace_session(source.current().await?).await)
            }
            _ => Ok(session.access_token),
        }
    }

    async fn replace_session(&self, fresh: Session) -> String {
        let token = fresh.access_token.clone();
        *self.session.write().await = fresh;
        token
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub async fn current_user(&self) -> Res<User> {
        self.get(&self.endpoint("/me")).await
    }

    pub async fn playlist(&self, playlist_id: &str) -> Res<Playlist> {
        let url = self.endpoint(&format!(
            "/playlists/{id}",
            id = urlencoding::encode(playlist_id)
        ));
        self.get(&url).await
    }

    pub async fn artist(&self, artist_id: &str) -> Res<Artist> {
        let url = self.endpoint(&format!(
            "/artists/{id}",
            id = urlencoding::encode(artist_id)
        ));
        self.get(&url).await
    }

    /// Playlists of the current user. Entries may be `null` for playlists that
    /// were removed or became inaccessible.
    pub fn current_user_playlists(&self) -> Paginator<'_, T, Option<Playlist>> {
        let url = self.endpoint(&format!("/me/playlists?limit={PAGE_SIZE}"));
        Paginator::new(self, url)
    }

    pub fn user_playlists(&self, user_id: &str) -> Paginator<'_, T, Option<Playlist>> {
        let url = self.endpoint(&format!(
            "/users/{id}/playlists?limit={PAGE_SIZE}",
            id = urlencoding::encode(user_id)
        ));
        Paginator::new(self, url)
    }

    pub fn playlist_tracks(&self, playlist_id: &str) -> Paginator<'_, T, TrackItem> {
        let url = self.endpoint(&format!(
            "/playlists/{id}/tracks?limit={PAGE_SIZE}",
            id = urlencoding::encode(playlist_id)
        ));
        Paginator::new(self, url)
    }

    pub fn saved_tracks(&self) -> Paginator<'_, T, TrackItem> {
        let url = self.endpoint(&format!("/me/tracks?limit={PAGE_SIZE}"));
        Paginator::new(self, url)
    }
}
