use crate::{
    cli::{
        report::{self, ReportOptions},
        session,
    },
    collector::Collector,
    error, utils,
};

/// Lists every saved track with the genres of its artist, then the report.
pub async fn liked(options: ReportOptions) {
    let config = session::load_config();
    let client = session::connect(&config).await;

    let pb = utils::spinner("Fetching liked songs...");
    let collector = Collector::new(&client).with_progress(pb.clone());

    let (songs, tally) = match collector.liked_songs().await {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch liked songs: {}", e);
        }
    };
    pb.finish_and_clear();

    for song in songs {
        println!("Song: {}, Artist: {}", song.song, song.artist);
        if song.genres.is_empty() {
            println!("No genres found for this artist.");
        } else {
            println!("Genres: {}", song.genres.join(", "));
        }
        println!("{}", "-".repeat(40));
    }

    report::print_report(&tally, options);
}
