use std::sync::Arc;

use crate::{
    Error,
    config::Config,
    error,
    management::{CredentialCache, Session, SessionManager},
    spotify::{SpotifyClient, auth::SpotifyAuth},
    warning,
};

/// Reads the configuration or exits with the name of the missing key.
pub fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!(
            "Cannot load configuration. Err: {}\nSee ~/.local/share/genrecli/.env.example",
            e
        ),
    }
}

/// Acquires a session, falling back to the interactive login when no
/// credential is cached, and returns a client bound to it.
///
/// The client keeps the session manager, so a token expiring or being
/// rejected in the middle of a long run is refreshed instead of failing every
/// later request.
pub async fn connect(config: &Config) -> SpotifyClient {
    let cache = CredentialCache::new(config.token_cache_path.clone());
    let manager = Arc::new(SessionManager::new(cache.clone(), SpotifyAuth::new(config)));

    let session = match manager.acquire().await {
        Ok(session) => session,
        Err(Error::NotAuthenticated) => {
            warning!("No cached credential found. Starting interactive login...");
            match crate::spotify::auth::login(config, &cache).await {
                Ok(credential) => Session::from(&credential),
                Err(e) => error!("Authentication failed: {}", e),
            }
        }
        Err(e) => error!("Cannot acquire Spotify session: {}", e),
    };

    SpotifyClient::new(config, &session).with_session_source(manager)
}
