//! # Collector
//!
//! Walks playlists (or saved tracks) through an authenticated
//! [`SpotifyClient`], resolves the primary artist of every track and counts the
//! artist genres in a [`GenreTally`].
//!
//! Everything runs sequentially: one playlist listing, one track listing per
//! playlist and one artist lookup per track. Only two failures are absorbed
//! here, a failing artist lookup (the track contributes no genres) and a
//! playlist whose tracks cannot be read (the playlist is skipped). Every other
//! error is returned to the caller.

mod filter;
mod tally;

use std::collections::HashSet;

use indicatif::ProgressBar;

pub use filter::PlaylistFilter;
pub use tally::GenreTally;

use crate::{
    Res, info,
    spotify::{SpotifyClient, Transport},
    types::{Playlist, SongGenres, Track, TrackItem},
    utils, warning,
};

/// Genre counting over one authenticated client.
///
/// # Example
///
/// ```rust,ignore
/// let collector = Collector::new(&client).with_progress(utils::spinner("Fetching..."));
/// let tally = collector.own_library(config.include_public_playlists).await?;
/// for (genre, count) in tally.report() {
///     println!("{}: {}", genre, count);
/// }
/// ```
pub struct Collector<'a, T: Transport> {
    client: &'a SpotifyClient<T>,
    progress: ProgressBar,
}

impl<'a, T: Transport> Collector<'a, T> {
    pub fn new(client: &'a SpotifyClient<T>) -> Self {
        Self {
            client,
            progress: ProgressBar::hidden(),
        }
    }

    /// Shows per-track progress on the given bar. Status lines are printed
    /// above it.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Genres of the track's first artist, unique and in API order.
    ///
    /// Empty, without any request, for a missing track, a local file, a track
    /// without artists or an artist without id. A failed artist lookup is
    /// reported and also yields an empty list, so one bad artist never ends
    /// the run.
    ///
    /// # Errors
    ///
    /// Only session failures ([`Error::is_auth_failure`](crate::Error::is_auth_failure)):
    /// a token the Web API keeps rejecting would otherwise turn every later
    /// lookup into an empty list and silently undercount the report.
    pub async fn genres_for(&self, track: Option<&Track>) -> Res<Vec<String>> {
        let Some(track) = track else {
            return Ok(Vec::new());
        };

        if track.id.is_none() || track.is_local {
            self.progress
                .suspend(|| warning!("Skipping local track: {}", track.name));
            return Ok(Vec::new());
        }

        let Some(artist_id) = track.primary_artist().and_then(|a| a.id.as_deref()) else {
            return Ok(Vec::new());
        };

        match self.client.artist(artist_id).await {
            Ok(artist) => {
                let mut seen = HashSet::new();
                Ok(artist
                    .genres
                    .into_iter()
                    .filter(|genre| seen.insert(genre.clone()))
                    .collect())
            }
            Err(e) if e.is_auth_failure() => Err(e),
            Err(e) => {
                self.progress.suspend(|| {
                    warning!(
                        "Error fetching genres for {} by {}: {}",
                        track.name,
                        track.artist_name(),
                        e
                    )
                });
                Ok(Vec::new())
            }
        }
    }

    /// Own-library mode: every playlist of the current user that the user owns.
    ///
    /// # Arguments
    ///
    /// * `include_public` - The `SPOTIFY_INCLUDE_PUBLIC_PLAYLISTS` flag. Own
    ///   playlists are counted whatever their visibility, so it changes nothing.
    ///
    /// # Errors
    ///
    /// Failing `/me` or playlist listing requests, session failures, and track
    /// listing errors other than 403/404 (those playlists are skipped).
    pub async fn own_library(&self, include_public: bool) -> Res<GenreTally> {
        let user = self.client.current_user().await?;
        let playlists = self.client.current_user_playlists().collect_all().await?;
        let filter = PlaylistFilter::own_library(user.id, include_public);

        self.tally_playlists(playlists.into_iter().flatten(), &filter)
            .await
    }

    /// Other-user mode: public playlists of the owner of `link`.
    ///
    /// Returns the resolved owner id together with the tally.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLink`](crate::Error::InvalidLink) for a link without a
    /// playlist id, plus everything [`own_library`](Self::own_library) can fail
    /// with.
    pub async fn other_user(&self, link: &str) -> Res<(String, GenreTally)> {
        let user_id = self.playlist_owner(link).await?;
        self.progress
            .suspend(|| info!("The user ID for the playlist is: {}", user_id));

        let playlists = self.client.user_playlists(&user_id).collect_all().await?;
        let tally = self
            .tally_playlists(playlists.into_iter().flatten(), &PlaylistFilter::OtherUser)
            .await?;

        Ok((user_id, tally))
    }

    /// Resolves a playlist link to the id of the user owning the playlist.
    ///
    /// Accepts a share link, a `spotify:playlist:` URI or a bare id. An invalid
    /// link fails before any request is made.
    pub async fn playlist_owner(&self, link: &str) -> Res<String> {
        let playlist_id = utils::playlist_id_from_link(link)?;
        let playlist = self.client.playlist(&playlist_id).await?;
        Ok(playlist.owner.id)
    }

    /// Tallies the genres of every track in the playlists accepted by `filter`.
    ///
    /// Playlists whose tracks answer 403 or 404 are reported and skipped. Any
    /// other listing error is returned.
    pub async fn tally_playlists<I>(&self, playlists: I, filter: &PlaylistFilter) -> Res<GenreTally>
    where
        I: IntoIterator<Item = Playlist>,
    {
        let mut tally = GenreTally::new();

        for playlist in playlists {
            if !filter.includes(&playlist) {
                continue;
            }

            self.progress
                .suspend(|| info!("Processing playlist: {}", playlist.name));

            let items = match self.client.playlist_tracks(&playlist.id).collect_all().await {
                Ok(items) => items,
                Err(e) if e.is_inaccessible() => {
                    self.progress.suspend(|| {
                        warning!("Skipping inaccessible playlist {}: {}", playlist.name, e)
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.tally_items(&items, &mut tally).await?;
        }

        Ok(tally)
    }

    /// Folds the genres of every non-null track in `items` into `tally`.
    ///
    /// # Errors
    ///
    /// Session failures from [`genres_for`](Self::genres_for).
    pub async fn tally_items(&self, items: &[TrackItem], tally: &mut GenreTally) -> Res<()> {
        for track in items.iter().filter_map(|item| item.track.as_ref()) {
            self.progress
                .set_message(format!("{} - {}", track.name, track.artist_name()));
            let genres = self.genres_for(Some(track)).await?;
            tally.tally(&genres);
        }
        Ok(())
    }

    /// Saved "Liked Songs" with their resolved genres, plus the tally over them.
    pub async fn liked_songs(&self) -> Res<(Vec<SongGenres>, GenreTally)> {
        let items = self.client.saved_tracks().collect_all().await?;
        let mut songs = Vec::with_capacity(items.len());
        let mut tally = GenreTally::new();

        for track in items.iter().filter_map(|item| item.track.as_ref()) {
            self.progress
                .set_message(format!("{} - {}", track.name, track.artist_name()));
            let genres = self.genres_for(Some(track)).await?;
            tally.tally(&genres);
            songs.push(SongGenres {
                song: track.name.clone(),
                artist: track.artist_name().to_string(),
                genres,
            });
        }

        Ok((songs, tally))
    }
}
