//! Error types shared by every layer of genrecli.

use thiserror::Error;

/// Main error type for configuration, authentication and Spotify API operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration key is not set.
    #[error("Missing configuration value: {0}")]
    MissingConfig(String),

    /// A configuration key is set but cannot be parsed.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// No cached credential exists, an interactive login is required.
    #[error("Not authenticated. Please run genrecli auth")]
    NotAuthenticated,

    /// Token refresh or code exchange was rejected, or the login flow failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The credential cache exists but cannot be read back.
    #[error("Corrupt credential cache at {path}: {message}. Delete the file and run genrecli auth")]
    CorruptCache { path: String, message: String },

    /// The given playlist link does not contain a playlist id.
    #[error("Invalid playlist link: {0}")]
    InvalidLink(String),

    /// The Spotify Web API answered with a non-success status.
    #[error("Spotify API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for API answers meaning the resource exists but cannot be read by
    /// this user (private, removed or region locked).
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Error::Api { status: 403 | 404, .. })
    }

    /// True when the session itself is unusable: a rejected access token
    /// (HTTP 401) or a failed login/refresh. Such errors end the run instead of
    /// being absorbed per track.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::NotAuthenticated | Error::Auth(_) | Error::Api { status: 401, .. }
        )
    }
}

/// Result type alias for genrecli operations.
pub type Res<T> = std::result::Result<T, Error>;
