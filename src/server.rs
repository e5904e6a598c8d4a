use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api, spotify::auth::LoginState};

/// Serves the OAuth callback routes until the task is aborted.
pub async fn serve(listener: TcpListener, state: Arc<LoginState>) -> Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    axum::serve(listener, app).await?;
    Ok(())
}
