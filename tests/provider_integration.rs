//! Secondary-provider lookups through the public API.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use archiver_core::{
    CredentialCache, ItemOutcome, ProviderError, RedgifsClient, SavedAs, provider::CREDENTIAL_TTL,
};
use serde_json::json;
use support::socket_guard::start_mock_server_or_skip;
use support::{materializer, title_only_config};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_rotating_tokens(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/temporary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "stale"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/temporary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "fresh"})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_rejected_credential_refreshes_once_then_succeeds() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_rotating_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/gifs/happyfox"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gifs/happyfox"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gif": {"urls": {"sd": "https://media.example/happyfox-sd.mp4",
                             "hd": "https://media.example/happyfox.mp4"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        RedgifsClient::with_base_url(server.uri(), Arc::new(CredentialCache::default())).unwrap();
    let url = client.resolve_media_url("happyfox").await.unwrap();
    assert_eq!(url, "https://media.example/happyfox.mp4");
}

#[tokio::test]
async fn test_second_rejection_is_unauthorized() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_rotating_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/gifs/happyfox"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client =
        RedgifsClient::with_base_url(server.uri(), Arc::new(CredentialCache::default())).unwrap();
    let err = client.resolve_media_url("happyfox").await.unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_provider_video_is_saved_as_mp4() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/auth/temporary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gifs/sleepyotter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gif": {"urls": {"hd": format!("{}/video/sleepyotter.mp4", server.uri())}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video/sleepyotter.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let provider =
        RedgifsClient::with_base_url(server.uri(), Arc::new(CredentialCache::default())).unwrap();
    let materializer =
        materializer(title_only_config(), &server.uri(), temp.path()).with_provider(provider);
    let item: archiver_core::Item = serde_json::from_value(json!({
        "name": "t3_otter",
        "title": "Otter",
        "subreddit": "aww",
        "post_hint": "link",
        "domain": "redgifs.com",
        "url": "https://www.redgifs.com/watch/sleepyotter"
    }))
    .unwrap();

    let outcome = materializer.materialize(&item, None).await;
    let ItemOutcome::Saved { counter, files, .. } = outcome else {
        panic!("expected saved outcome, got {outcome:?}");
    };
    assert_eq!(counter, SavedAs::Media);
    assert_eq!(files, vec![temp.path().join("aww/Otter.mp4")]);
    let md = std::fs::read_to_string(temp.path().join("aww/Otter.md")).unwrap();
    assert!(md.contains("/video/sleepyotter.mp4"));
}

#[test]
fn test_cached_credential_is_reused_within_ttl() {
    let cache = CredentialCache::new(CREDENTIAL_TTL);
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;
    let fetch = move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ProviderError>("token".to_string())
    };

    let first = tokio_test::block_on(cache.get_or_refresh(None, fetch)).unwrap();
    let second = tokio_test::block_on(cache.get_or_refresh(None, fetch)).unwrap();

    assert_eq!(first, second);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}
