use async_trait::async_trait;
use chrono::Utc;

use crate::{
    Error, Res, info,
    management::CredentialCache,
    types::{Credential, TokenResponse},
};

/// Exchanges a refresh token for a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Res<TokenResponse>;
}

/// Hands out sessions to a running client.
///
/// [`SpotifyClient`](crate::spotify::SpotifyClient) asks for
/// [`current`](SessionSource::current) when its token has passed `expires_at`
/// and for [`renew`](SessionSource::renew) when the Web API rejects the token
/// with HTTP 401.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// A session whose token is usable now, refreshing only when expired.
    async fn current(&self) -> Res<Session>;

    /// A session with a newly refreshed token, whatever the cached expiry says.
    async fn renew(&self) -> Res<Session>;
}

/// Authenticated handle bound to one access token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    /// Absolute expiry in epoch seconds.
    pub expires_at: i64,
}

impl Session {
    /// Same rule as the credential cache: usable only while `now < expires_at`.
    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

impl From<&Credential> for Session {
    fn from(credential: &Credential) -> Self {
        Self {
            access_token: credential.access_token.clone(),
            expires_at: credential.expires_at.unwrap_or_default(),
        }
    }
}

/// Keeps the cached credential usable.
///
/// Reads the credential from a [`CredentialCache`], refreshes it through a
/// [`TokenRefresher`] when it has expired and writes the merged record back.
///
/// # Example
///
/// ```rust,ignore
/// let cache = CredentialCache::new(config.token_cache_path.clone());
/// let manager = SessionManager::new(cache, SpotifyAuth::new(&config));
/// let session = manager.acquire().await?;
/// ```
pub struct SessionManager<R: TokenRefresher> {
    cache: CredentialCache,
    refresher: R,
}

impl<R: TokenRefresher> SessionManager<R> {
    pub fn new(cache: CredentialCache, refresher: R) -> Self {
        SessionManager { cache, refresher }
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// [`acquire_at`](Self::acquire_at) with the current wall clock.
    pub async fn acquire(&self) -> Res<Session> {
        self.acquire_at(Utc::now().timestamp()).await
    }

    /// Returns a session for the cached credential, refreshing it first when
    /// `now >= expires_at`.
    ///
    /// A still valid credential costs no refresh call, an expired one exactly
    /// one. A refresh rewrites the whole cache file.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] when no credential is cached
    /// - [`Error::CorruptCache`] when the cache file cannot be parsed
    /// - [`Error::Auth`] when the credential has no refresh token or the
    ///   refresh is rejected
    pub async fn acquire_at(&self, now: i64) -> Res<Session> {
        let credential = self.load().await?;
        if credential.is_usable_at(now) {
            return Ok(Session::from(&credential));
        }

        info!("Access token expired. Refreshing...");
        self.refresh(credential, now).await
    }

    /// Refreshes the cached credential unconditionally.
    ///
    /// Used when the Web API rejects a token the cache still considers valid,
    /// for example after it was revoked. Errors as
    /// [`acquire_at`](Self::acquire_at).
    pub async fn renew_at(&self, now: i64) -> Res<Session> {
        let credential = self.load().await?;

        info!("Access token rejected. Refreshing...");
        self.refresh(credential, now).await
    }

    async fn load(&self) -> Res<Credential> {
        self.cache.load().await?.ok_or(Error::NotAuthenticated)
    }

    async fn refresh(&self, mut credential: Credential, now: i64) -> Res<Session> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Auth("cached credential has no refresh token, run genrecli auth".to_string())
            })?;

        let token = self.refresher.refresh(&refresh_token).await?;
        credential.merge(token, now);
        self.cache.persist(&credential).await?;

        Ok(Session::from(&credential))
    }
}

#[async_trait]
impl<R: TokenRefresher> SessionSource for SessionManager<R> {
    async fn current(&self) -> Res<Session> {
        self.acquire().await
    }

    async fn renew(&self) -> Res<Session> {
        self.renew_at(Utc::now().timestamp()).await
    }
}
