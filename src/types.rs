use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// Cached OAuth credential, the sole record of the credential cache file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Fields written by other tools, kept as they are on rewrite.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Credential {
    pub fn from_token_response(token: TokenResponse, now: i64) -> Self {
        let mut credential = Credential::default();
        credential.merge(token, now);
        credential
    }

    /// Usable only while `now < expires_at`.
    pub fn is_usable_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && self.expires_at.is_some_and(|at| now < at)
    }

    /// Merges a token endpoint answer into this record. The refresh token is
    /// only replaced when the server rotates it.
    pub fn merge(&mut self, token: TokenResponse, now: i64) {
        self.access_token = token.access_token;
        self.expires_in = Some(token.expires_in);
        self.expires_at = Some(now + token.expires_in);
        if let Some(scope) = token.scope {
            self.scope = scope;
        }
        if token.token_type.is_some() {
            self.token_type = token.token_type;
        }
        if let Some(refresh_token) = token.refresh_token.filter(|t| !t.is_empty()) {
            self.refresh_token = Some(refresh_token);
        }
    }
}

/// Answer of the token endpoint for both the authorization-code and the
/// refresh grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub state: String,
    pub token: Option<TokenResponse>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub owner: User,
    #[serde(default)]
    pub public: Option<bool>,
}

impl Playlist {
    pub fn owner_id(&self) -> &str {
        &self.owner.id
    }

    pub fn is_public(&self) -> bool {
        self.public.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// `None` for local files that are not in the Spotify catalog.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub is_local: bool,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }

    pub fn artist_name(&self) -> &str {
        self.primary_artist()
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown")
    }
}

/// Entry of a playlist track listing or of the saved tracks listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Spotify paging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<I> {
    #[serde(default = "Vec::new")]
    pub items: Vec<I>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Genres resolved for one saved track.
#[derive(Debug, Clone)]
pub struct SongGenres {
    pub song: String,
    pub artist: String,
    pub genres: Vec<String>,
}

#[derive(Tabled)]
pub struct GenreTableRow {
    pub genre: String,
    pub count: u64,
}
