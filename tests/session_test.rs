use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use genrecli::{
    Error, Res,
    management::{CredentialCache, SessionManager, SessionSource, TokenRefresher},
    types::{Credential, TokenResponse},
};
use serde_json::json;

const NOW: i64 = 1_700_000_000;

struct CountingRefresher {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, refresh_token: &str) -> Res<TokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(refresh_token, "refresh-1");

        if self.fail {
            return Err(Error::Auth("invalid_grant".to_string()));
        }

        Ok(TokenResponse {
            access_token: "fresh-access".to_string(),
            token_type: Some("Bearer".to_string()),
            scope: None,
            expires_in: 3600,
            refresh_token: None,
        })
    }
}

fn temp_cache() -> CredentialCache {
    let dir: PathBuf = std::env::temp_dir().join(format!("genrecli-test-{}", rand::random::<u64>()));
    CredentialCache::new(dir.join("token.json"))
}

fn manager(cache: CredentialCache, fail: bool) -> (SessionManager<CountingRefresher>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let refresher = CountingRefresher {
        calls: Arc::clone(&calls),
        fail,
    };
    (SessionManager::new(cache, refresher), calls)
}

fn credential(expires_at: i64, refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: "cached-access".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: Some(expires_at),
        scope: "playlist-read-private user-library-read".to_string(),
        ..Default::default()
    }
}

async fn cleanup(cache: &CredentialCache) {
    if let Some(dir) = cache.path().parent() {
        let _ = async_fs::remove_dir_all(dir).await;
    }
}

#[tokio::test]
async fn test_expired_credential_is_refreshed_once() {
    let cache = temp_cache();
    cache.persist(&credential(NOW - 10, Some("refresh-1"))).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);

    let session = manager.acquire_at(NOW).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.access_token, "fresh-access");
    assert_eq!(session.expires_at, NOW + 3600);

    let stored = cache.load().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "fresh-access");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
    assert!(stored.expires_at.unwrap() > NOW);
    assert_eq!(stored.scope, "playlist-read-private user-library-read");

    // the rewritten credential is used as is on the next run
    manager.acquire_at(NOW + 1).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cleanup(&cache).await;
}

#[tokio::test]
async fn test_expiry_boundary_triggers_refresh() {
    let cache = temp_cache();
    cache.persist(&credential(NOW, Some("refresh-1"))).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);

    manager.acquire_at(NOW).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_valid_credential_is_used_without_refresh() {
    let cache = temp_cache();
    cache.persist(&credential(NOW + 600, Some("refresh-1"))).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);

    let session = manager.acquire_at(NOW).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.access_token, "cached-access");
    assert_eq!(session.expires_at, NOW + 600);
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_acquire_uses_current_time() {
    let cache = temp_cache();
    let far_future = chrono::Utc::now().timestamp() + 3600;
    cache.persist(&credential(far_future, None)).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);

    let session = manager.acquire().await.unwrap();

    assert_eq!(session.access_token, "cached-access");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_missing_cache_is_not_authenticated() {
    let cache = temp_cache();
    let (manager, calls) = manager(cache, false);

    let err = manager.acquire_at(NOW).await.unwrap_err();

    assert!(matches!(err, Error::NotAuthenticated));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_without_refresh_token_fails() {
    let cache = temp_cache();
    cache.persist(&credential(NOW - 1, None)).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);

    let err = manager.acquire_at(NOW).await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_failed_refresh_leaves_cache_untouched() {
    let cache = temp_cache();
    let expired = credential(NOW - 1, Some("refresh-1"));
    cache.persist(&expired).await.unwrap();
    let (manager, calls) = manager(cache.clone(), true);

    let err = manager.acquire_at(NOW).await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.load().await.unwrap(), Some(expired));
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_corrupt_cache_is_reported() {
    let cache = temp_cache();
    async_fs::create_dir_all(cache.path().parent().unwrap()).await.unwrap();
    async_fs::write(cache.path(), "{ not json").await.unwrap();
    let (manager, _) = manager(cache.clone(), false);

    let err = manager.acquire_at(NOW).await.unwrap_err();

    assert!(matches!(err, Error::CorruptCache { .. }));
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_refresh_keeps_unknown_fields() {
    let cache = temp_cache();
    let raw = json!({
        "access_token": "cached-access",
        "refresh_token": "refresh-1",
        "expires_at": NOW - 5,
        "scope": "user-library-read",
        "written_by": "another-tool"
    });
    async_fs::create_dir_all(cache.path().parent().unwrap()).await.unwrap();
    async_fs::write(cache.path(), raw.to_string()).await.unwrap();
    let (manager, _) = manager(cache.clone(), false);

    manager.acquire_at(NOW).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&async_fs::read_to_string(cache.path()).await.unwrap()).unwrap();
    assert_eq!(written["written_by"], "another-tool");
    assert_eq!(written["access_token"], "fresh-access");
    assert_eq!(written["expires_at"], NOW + 3600);
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_renew_refreshes_a_valid_credential() {
    let cache = temp_cache();
    cache.persist(&credential(NOW + 600, Some("refresh-1"))).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);

    let session = manager.renew_at(NOW).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.access_token, "fresh-access");
    assert_eq!(
        cache.load().await.unwrap().unwrap().access_token,
        "fresh-access"
    );
    cleanup(&cache).await;
}

#[tokio::test]
async fn test_manager_as_session_source() {
    let cache = temp_cache();
    let valid_until = chrono::Utc::now().timestamp() + 3600;
    cache.persist(&credential(valid_until, Some("refresh-1"))).await.unwrap();
    let (manager, calls) = manager(cache.clone(), false);
    let source: &dyn SessionSource = &manager;

    assert_eq!(source.current().await.unwrap().access_token, "cached-access");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(source.renew().await.unwrap().access_token, "fresh-access");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    cleanup(&cache).await;
}
