use crate::{
    cli::{
        report::{self, ReportOptions},
        session,
    },
    collector::Collector,
    error, info, success, utils,
};

/// Genre report over the playlists owned by the authenticated user.
pub async fn genres(options: ReportOptions) {
    let config = session::load_config();
    let client = session::connect(&config).await;

    if config.include_public_playlists {
        info!("SPOTIFY_INCLUDE_PUBLIC_PLAYLISTS is set; own playlists are included regardless of visibility.");
    }

    let pb = utils::spinner("Fetching playlists...");
    let collector = Collector::new(&client).with_progress(pb.clone());

    let tally = match collector.own_library(config.include_public_playlists).await {
        Ok(tally) => tally,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to collect genres: {}", e);
        }
    };

    pb.finish_and_clear();
    success!("Counted {} distinct genres.", tally.len());
    report::print_report(&tally, options);
}

/// Genre report over the public playlists of the user owning `link`.
///
/// Falls back to `SPOTIFY_PUBLIC_PLAYLIST_URI` when no link is given.
pub async fn user_genres(link: Option<String>, options: ReportOptions) {
    let config = session::load_config();

    let Some(link) = link.or_else(|| config.public_playlist_uri.clone()) else {
        error!("No playlist link given. Pass one or set SPOTIFY_PUBLIC_PLAYLIST_URI.");
    };

    let client = session::connect(&config).await;

    let pb = utils::spinner("Resolving playlist owner...");
    let collector = Collector::new(&client).with_progress(pb.clone());

    let (user_id, tally) = match collector.other_user(&link).await {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to collect genres for {}: {}", link, e);
        }
    };

    pb.finish_and_clear();
    success!(
        "Counted {} distinct genres in public playlists of {}.",
        tally.len(),
        user_id
    );
    report::print_report(&tally, options);
}
