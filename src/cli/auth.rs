use crate::{
    cli::session, error, management::CredentialCache, spotify, success,
};

pub async fn auth() {
    let config = session::load_config();
    let cache = CredentialCache::new(config.token_cache_path.clone());

    match spotify::auth::login(&config, &cache).await {
        Ok(_) => success!(
            "Authentication successful! Credential saved to {}",
            cache.path().display()
        ),
        Err(e) => error!("Authentication failed: {}", e),
    }
}
