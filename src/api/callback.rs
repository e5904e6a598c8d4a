use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{spotify::auth::LoginState, warning};

/// Completes the authorization-code flow.
///
/// Spotify redirects here with either `code` and `state`, or `error`. The
/// outcome is stored in the pending PKCE state polled by the login flow.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<LoginState>>,
) -> Html<&'static str> {
    let mut pending = shared_state.pending.lock().await;
    let Some(pkce_state) = pending.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    if let Some(error) = params.get("error") {
        pkce_state.error = Some(format!("authorization denied: {}", error));
        return Html("<h4>Authorization denied.</h4>");
    }

    if params.get("state") != Some(&pkce_state.state) {
        return Html("<h4>State mismatch, please restart genrecli auth.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match shared_state
        .auth
        .exchange_code(code, &pkce_state.code_verifier)
        .await
    {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            pkce_state.error = Some(e.to_string());
            Html("<h4>Login failed.</h4>")
        }
    }
}
