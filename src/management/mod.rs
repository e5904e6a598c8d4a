//! # Management Module
//!
//! Local state that outlives a single run: the cached OAuth credential and the
//! session logic that keeps it usable.
//!
//! - [`CredentialCache`] - Reads and rewrites the JSON credential file
//! - [`SessionManager`] - Refreshes an expired credential and hands out
//!   [`Session`]s, also as a [`SessionSource`] for long running clients
//! - [`TokenRefresher`] - The refresh-grant seam, implemented by
//!   [`SpotifyAuth`](crate::spotify::auth::SpotifyAuth)

mod credential;
mod session;

pub use credential::CredentialCache;
pub use session::Session;
pub use session::SessionManager;
pub use session::SessionSource;
pub use session::TokenRefresher;
