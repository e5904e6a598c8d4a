//! # CLI Module
//!
//! Command implementations behind the `genrecli` binary. Each command loads the
//! configuration, acquires a Spotify session (refreshing the cached credential
//! or starting the interactive login when none is cached), runs the
//! [`Collector`](crate::collector::Collector) and prints the report.
//!
//! ## Commands
//!
//! - [`auth`] - Interactive OAuth login, stores the credential cache
//! - [`genres`] - Genre report over the playlists you own
//! - [`user_genres`] - Genre report over the public playlists of the owner of a
//!   playlist link
//! - [`liked`] - Genres of every saved track, followed by the report
//! - [`owner`] - Prints the user id owning a playlist link
//!
//! ## Error Handling
//!
//! Commands are the only place where errors end the process: fatal errors are
//! printed through the `error!` macro, which exits with code 1. Recoverable
//! problems (local tracks, a failing artist lookup, an inaccessible playlist)
//! are printed as warnings by the collector and the run continues.
//!
//! ## Usage
//!
//! ```bash
//! genrecli auth                          # Authorize once
//! genrecli genres --limit 20             # Top 20 genres of your playlists
//! genrecli user https://open.spotify.com/playlist/1NMBntrpcYybqbthT3eapO
//! genrecli liked --table                 # Liked songs as a table report
//! ```

mod auth;
mod genres;
mod liked;
mod owner;
mod report;
mod session;

pub use auth::auth;
pub use genres::genres;
pub use genres::user_genres;
pub use liked::liked;
pub use owner::owner;
pub use report::ReportOptions;
