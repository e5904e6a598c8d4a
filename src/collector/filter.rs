use crate::types::Playlist;

/// Decides which playlists take part in a report.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistFilter {
    /// Playlists owned by `user_id`. `include_public` is carried for
    /// compatibility with older configurations: own playlists are included
    /// whatever their visibility, so the flag does not change the result.
    OwnLibrary { user_id: String, include_public: bool },
    /// Another user's playlists: only public ones can be read.
    OtherUser,
}

impl PlaylistFilter {
    pub fn own_library(user_id: impl Into<String>, include_public: bool) -> Self {
        PlaylistFilter::OwnLibrary {
            user_id: user_id.into(),
            include_public,
        }
    }

    /// Whether `playlist` takes part in the report.
    ///
    /// Own library: the owner id equals the current user id. Other user: the
    /// playlist is public, a `null` visibility counts as private.
    pub fn includes(&self, playlist: &Playlist) -> bool {
        match self {
            PlaylistFilter::OwnLibrary { user_id, .. } => playlist.owner_id() == user_id,
            PlaylistFilter::OtherUser => playlist.is_public(),
        }
    }
}
