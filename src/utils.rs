use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::{Error, Res};

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_state() -> String {
    random_string(16)
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Extracts the playlist id from a share link, a `spotify:playlist:` URI or a
/// bare id.
///
/// `https://open.spotify.com/playlist/1NMBntrpcYybqbthT3eapO?si=a8d1` yields
/// `1NMBntrpcYybqbthT3eapO`.
pub fn playlist_id_from_link(link: &str) -> Res<String> {
    let trimmed = link.trim();

    let candidate = match trimmed.strip_prefix("spotify:playlist:") {
        Some(rest) => rest,
        None => {
            let path = trimmed.split(['?', '#']).next().unwrap_or_default();
            let path = path.trim_end_matches('/');
            if path.contains('/') && !path.contains("/playlist/") {
                return Err(Error::InvalidLink(link.to_string()));
            }
            path.rsplit('/').next().unwrap_or_default()
        }
    };

    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidLink(link.to_string()));
    }

    Ok(candidate.to_string())
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
