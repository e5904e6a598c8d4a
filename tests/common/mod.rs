#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use genrecli::{
    Error, Res,
    management::{Session, SessionSource},
    spotify::{SpotifyClient, Transport},
};
use serde_json::{Value, json};

pub const API: &str = "https://api.test/v1";
pub const TOKEN: &str = "test-token";
pub const FRESH_TOKEN: &str = "fresh-token";

/// In-memory Web API: serves canned JSON by URL and records every request.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Value>,
    failures: HashMap<String, u16>,
    calls: Arc<Mutex<Vec<String>>>,
    tokens: Arc<Mutex<Vec<String>>>,
    expire_after: Option<usize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(url(path), body);
        self
    }

    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.failures.insert(url(path), status);
        self
    }

    /// [`TOKEN`] is answered with 401 from request number `requests + 1` on.
    /// Any other token keeps working.
    pub fn expire_token_after(mut self, requests: usize) -> Self {
        self.expire_after = Some(requests);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    /// Access token sent with every request, in request order.
    pub fn tokens(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.tokens)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str, access_token: &str) -> Res<Value> {
        let served = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len()
        };
        self.tokens.lock().unwrap().push(access_token.to_string());

        if access_token == TOKEN && self.expire_after.is_some_and(|n| served > n) {
            return Err(Error::Api {
                status: 401,
                message: "The access token expired".to_string(),
            });
        }

        if let Some(status) = self.failures.get(url) {
            return Err(Error::Api {
                status: *status,
                message: "fake failure".to_string(),
            });
        }

        self.routes.get(url).cloned().ok_or_else(|| Error::Api {
            status: 404,
            message: format!("no route for {url}"),
        })
    }
}

pub fn url(path: &str) -> String {
    format!("{API}{path}")
}

pub fn session() -> Session {
    Session {
        access_token: TOKEN.to_string(),
        expires_at: i64::MAX,
    }
}

/// Session source handing out [`FRESH_TOKEN`] and counting what was asked.
#[derive(Default)]
pub struct FakeSource {
    pub token: String,
    pub current_calls: AtomicUsize,
    pub renew_calls: AtomicUsize,
}

impl FakeSource {
    pub fn fresh() -> Arc<Self> {
        Self::issuing(FRESH_TOKEN)
    }

    pub fn issuing(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: token.to_string(),
            ..Self::default()
        })
    }

    fn session(&self) -> Session {
        Session {
            access_token: self.token.clone(),
            expires_at: i64::MAX,
        }
    }
}

#[async_trait]
impl SessionSource for FakeSource {
    async fn current(&self) -> Res<Session> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.session())
    }

    async fn renew(&self) -> Res<Session> {
        self.renew_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.session())
    }
}

/// Builds the client and hands back the shared request log.
pub fn client(transport: FakeTransport) -> (SpotifyClient<FakeTransport>, Arc<Mutex<Vec<String>>>) {
    let calls = transport.calls();
    (
        SpotifyClient::with_transport(transport, API, &session()),
        calls,
    )
}

pub fn count_calls(calls: &Arc<Mutex<Vec<String>>>, prefix: &str) -> usize {
    let prefix = url(prefix);
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with(&prefix))
        .count()
}

pub fn playlist(id: &str, owner: &str, public: Option<bool>) -> Value {
    json!({
        "id": id,
        "name": format!("Playlist {id}"),
        "owner": { "id": owner, "display_name": owner },
        "public": public,
    })
}

pub fn track(id: &str, artist_id: &str) -> Value {
    json!({
        "track": {
            "id": id,
            "name": format!("Song {id}"),
            "is_local": false,
            "artists": [
                { "id": artist_id, "name": format!("Artist {artist_id}") },
                { "id": "ignored", "name": "Featured" }
            ]
        }
    })
}

pub fn local_track(name: &str) -> Value {
    json!({
        "track": {
            "id": null,
            "name": name,
            "is_local": true,
            "artists": [{ "id": null, "name": "Local Artist" }]
        }
    })
}

pub fn page(items: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "items": items,
        "next": next.map(url),
        "total": null,
    })
}

pub fn artist(id: &str, genres: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("Artist {id}"),
        "genres": genres,
    })
}
