use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    config::Config,
    info,
    management::{CredentialCache, TokenRefresher},
    server, spotify,
    types::{Credential, PkceToken, TokenResponse},
    utils, warning,
};

/// How long the interactive login waits for the browser callback.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the Spotify accounts service.
///
/// Authenticates itself with HTTP basic auth built from the configured client
/// id and secret.
#[derive(Debug, Clone)]
pub struct SpotifyAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: String,
    token_url: String,
}

impl SpotifyAuth {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
        }
    }

    /// URL the user opens to grant access.
    pub fn authorize_url(&self, code_challenge: &str, state: &str) -> String {
        format!(
            "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&state={state}&scope={scope}",
            auth_url = self.auth_url,
            client_id = urlencoding::encode(&self.client_id),
            redirect_uri = urlencoding::encode(&self.redirect_uri),
            code_challenge = code_challenge,
            state = urlencoding::encode(state),
            scope = urlencoding::encode(&self.scope),
        )
    }

    fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// Exchanges an authorization code plus PKCE verifier for a token.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Res<TokenResponse> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Res<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, self.basic_auth())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint answered {}: {}",
                status.as_u16(),
                spotify::api_error_message(&body)
            )));
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}

#[async_trait]
impl TokenRefresher for SpotifyAuth {
    async fn refresh(&self, refresh_token: &str) -> Res<TokenResponse> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}

/// State shared between the login flow and the callback handler.
pub struct LoginState {
    pub auth: SpotifyAuth,
    pub pending: Mutex<Option<PkceToken>>,
}

/// Runs the OAuth 2.0 authorization-code flow with PKCE.
///
/// 1. Generates the code verifier, its S256 challenge and a `state` value
/// 2. Starts the local callback server on `SERVER_ADDRESS`
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the callback to exchange the code for a token
/// 5. Persists the resulting credential to the cache
///
/// # Errors
///
/// Fails when the callback server cannot bind, the user denies access, the
/// code exchange is rejected, or no callback arrives within two minutes.
pub async fn login(config: &Config, cache: &CredentialCache) -> Res<Credential> {
    let auth = SpotifyAuth::new(config);

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state_token = utils::generate_state();
    let auth_url = auth.authorize_url(&code_challenge, &state_token);

    let shared_state = Arc::new(LoginState {
        auth,
        pending: Mutex::new(Some(PkceToken {
            code_verifier,
            state: state_token,
            token: None,
            error: None,
        })),
    });

    let addr: SocketAddr = config
        .server_address
        .parse()
        .map_err(|e: std::net::AddrParseError| Error::InvalidConfig {
            key: "SERVER_ADDRESS".to_string(),
            message: e.to_string(),
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    } else {
        info!("Waiting for authorization in the browser...");
    }

    let outcome = wait_for_token(&shared_state).await;
    server.abort();

    let token = outcome?;
    let credential = Credential::from_token_response(token, Utc::now().timestamp());
    cache.persist(&credential).await?;
    Ok(credential)
}

async fn wait_for_token(shared_state: &LoginState) -> Res<TokenResponse> {
    let start = std::time::Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        {
            let lock = shared_state.pending.lock().await;
            if let Some(pkce) = lock.as_ref() {
                if let Some(token) = &pkce.token {
                    return Ok(token.clone());
                }
                if let Some(error) = &pkce.error {
                    return Err(Error::Auth(error.clone()));
                }
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Err(Error::Auth("authentication timed out".to_string()))
}
