use crate::{cli::session, collector::Collector, error, info};

pub async fn owner(link: String) {
    let config = session::load_config();
    let client = session::connect(&config).await;

    match Collector::new(&client).playlist_owner(&link).await {
        Ok(user_id) => info!("The user ID for the playlist is: {}", user_id),
        Err(e) => error!("Cannot resolve playlist owner: {}", e),
    }
}
