//! Configuration management for genrecli.
//!
//! Configuration is read from environment variables into an explicit [`Config`]
//! struct that is passed to the session manager and the Spotify client. Values
//! come from, in order of priority:
//! 1. Process environment variables
//! 2. A `.env` file in the current working directory
//! 3. A `.env` file in the local data directory (`genrecli/.env`)
//! 4. Built-in defaults for the optional keys

use std::{env, path::PathBuf};

use crate::{Error, Res};

pub const DEFAULT_SCOPE: &str =
    "user-library-read user-read-private playlist-read-private playlist-read-collaborative";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Loads environment variables from `.env` files.
///
/// The working directory `.env` is read first, then the one in the local data
/// directory:
/// - Linux: `~/.local/share/genrecli/.env`
/// - macOS: `~/Library/Application Support/genrecli/.env`
/// - Windows: `%LOCALAPPDATA%/genrecli/.env`
///
/// dotenv never overrides variables that are already set, so the process
/// environment always wins. Missing files are skipped.
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let local = PathBuf::from(".env");
    if local.is_file() {
        dotenv::from_path(&local).map_err(|e| e.to_string())?;
    }

    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrecli/.env");
    path
}

/// Default location of the credential cache file.
pub fn default_token_cache_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrecli/cache/token.json");
    path
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Playlist link used by other-user mode when none is given on the command line.
    pub public_playlist_uri: Option<String>,
    /// Own-library flag kept for compatibility. Own playlists are always
    /// included regardless of visibility, so this currently changes nothing.
    pub include_public_playlists: bool,
    pub scope: String,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub server_address: String,
    pub token_cache_path: PathBuf,
    pub max_retries: u32,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| get(key).ok_or_else(|| Error::MissingConfig(key.to_string()));

        let include_public_playlists = match get("SPOTIFY_INCLUDE_PUBLIC_PLAYLISTS") {
            Some(v) => parse_bool("SPOTIFY_INCLUDE_PUBLIC_PLAYLISTS", &v)?,
            None => false,
        };

        let max_retries = match get("GENRECLI_MAX_RETRIES") {
            Some(v) => v.parse::<u32>().map_err(|e| Error::InvalidConfig {
                key: "GENRECLI_MAX_RETRIES".to_string(),
                message: e.to_string(),
            })?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Self {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            public_playlist_uri: get("SPOTIFY_PUBLIC_PLAYLIST_URI"),
            include_public_playlists,
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            server_address: get("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            token_cache_path: get("GENRECLI_TOKEN_CACHE")
                .map(PathBuf::from)
                .unwrap_or_else(default_token_cache_path),
            max_retries,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Res<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(Error::InvalidConfig {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SPOTIFY_CLIENT_ID", "client"),
        ("SPOTIFY_CLIENT_SECRET", "secret"),
        ("SPOTIFY_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.client_id, "client");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!config.include_public_playlists);
        assert!(config.public_playlist_uri.is_none());
        assert!(config.token_cache_path.ends_with("genrecli/cache/token.json"));
    }

    #[test]
    fn test_missing_required_key_is_named() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        match err {
            Error::MissingConfig(key) => assert_eq!(key, "SPOTIFY_REDIRECT_URI"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("SPOTIFY_CLIENT_ID", "   ");
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::MissingConfig(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SPOTIFY_API_URL", "http://localhost:9000/v1/"));
        pairs.push(("SPOTIFY_INCLUDE_PUBLIC_PLAYLISTS", "Yes"));
        pairs.push(("SPOTIFY_PUBLIC_PLAYLIST_URI", "spotify:playlist:abc"));
        pairs.push(("GENRECLI_TOKEN_CACHE", "/tmp/token.json"));
        pairs.push(("GENRECLI_MAX_RETRIES", "0"));

        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.api_url, "http://localhost:9000/v1");
        assert!(config.include_public_playlists);
        assert_eq!(
            config.public_playlist_uri.as_deref(),
            Some("spotify:playlist:abc")
        );
        assert_eq!(config.token_cache_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SPOTIFY_INCLUDE_PUBLIC_PLAYLISTS", "maybe"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::InvalidConfig { .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GENRECLI_MAX_RETRIES", "-1"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
