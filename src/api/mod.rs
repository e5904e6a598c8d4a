//! # API Module
//!
//! HTTP endpoints served by the temporary local server that runs during
//! `genrecli auth`.
//!
//! - [`callback`] - Receives the redirect from Spotify's authorization server,
//!   checks the `state` value and exchanges the code for a token.
//! - [`health`] - Returns status and version, handy to check that the
//!   redirect URI points at the right address.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use genrecli::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
