//! Client tests against a mocked Spotify API.

use serde_json::json;
use spotify_api::{PlayRequest, SearchType, SpotifyApi, SpotifyClient, SpotifyError};
use spotify_core::SpotifyConfig;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SpotifyConfig {
    SpotifyConfig {
        api_url: server.uri(),
        accounts_url: server.uri(),
        ..Default::default()
    }
}

fn client_with_user_token(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new(&SpotifyConfig {
        access_token: Some("user-token".into()),
        ..config_for(server)
    })
    .unwrap()
}

fn client_with_app_credentials(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new(&SpotifyConfig {
        client_id: Some("id".into()),
        client_secret: Some("secret".into()),
        ..config_for(server)
    })
    .unwrap()
}

async fn mount_token_endpoint(server: &MockServer, expires_in: i64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-token",
            "token_type": "Bearer",
            "expires_in": expires_in
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_sends_query_kind_and_limit() {
    let server = MockServer::start().await;
    let body = json!({"tracks": {"items": [{"name": "Test Song"}], "total": 1}});

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "test"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_user_token(&server);
    let result = client.search(SearchType::Track, "test", 10).await.unwrap();
    assert_eq!(result, body);
}

#[tokio::test]
async fn play_forwards_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .and(body_json(json!({
            "uris": ["spotify:track:1", "spotify:track:2"],
            "position_ms": 30000
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_user_token(&server);
    let request: PlayRequest = serde_json::from_value(json!({
        "uris": ["spotify:track:1", "spotify:track:2"],
        "position_ms": 30000
    }))
    .unwrap();
    client.play(&request).await.unwrap();
}

#[tokio::test]
async fn play_sends_device_id_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .and(query_param("device_id", "kitchen"))
        .and(body_json(json!({"context_uri": "spotify:playlist:1"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_user_token(&server);
    let request = PlayRequest {
        context_uri: Some("spotify:playlist:1".into()),
        device_id: Some("kitchen".into()),
        ..Default::default()
    };
    client.play(&request).await.unwrap();
}

#[tokio::test]
async fn pause_hits_pause_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/pause"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_with_user_token(&server).pause().await.unwrap();
}

#[tokio::test]
async fn current_playback_without_content_is_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let state = client_with_user_token(&server)
        .current_playback()
        .await
        .unwrap();
    assert!(state.is_null());
}

#[tokio::test]
async fn current_user_returns_profile_body() {
    let server = MockServer::start().await;
    let profile = json!({"id": "alice", "display_name": "Alice"});

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile.clone()))
        .mount(&server)
        .await;

    let body = client_with_user_token(&server).current_user().await.unwrap();
    assert_eq!(body, profile);
}

#[tokio::test]
async fn api_errors_carry_spotify_message() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/pause"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"status": 404, "message": "Player command failed: No active device found"}
        })))
        .mount(&server)
        .await;

    let err = client_with_user_token(&server).pause().await.unwrap_err();
    match err {
        SpotifyError::Api { status, ref message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Player command failed: No active device found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn ensure_grants_once_and_uses_app_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer app-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "app"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_app_credentials(&server);
    assert!(!client.has_access_token().await);

    assert!(client.ensure_access_token().await.unwrap());
    assert!(!client.ensure_access_token().await.unwrap());
    assert!(client.has_access_token().await);

    client.current_user().await.unwrap();
}

#[tokio::test]
async fn ensure_with_user_token_never_grants() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600, 0).await;

    let client = SpotifyClient::new(&SpotifyConfig {
        client_id: Some("id".into()),
        client_secret: Some("secret".into()),
        access_token: Some("user-token".into()),
        ..config_for(&server)
    })
    .unwrap();

    assert!(!client.ensure_access_token().await.unwrap());
    assert!(!client.ensure_access_token().await.unwrap());
}

#[tokio::test]
async fn concurrent_ensure_grants_once() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 3600, 1).await;

    let client = client_with_app_credentials(&server);
    let results =
        futures::future::join_all((0..5).map(|_| client.ensure_access_token())).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(results.iter().filter(|r| *r.as_ref().unwrap()).count(), 1);
}

#[tokio::test]
async fn expired_app_token_is_regranted() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 0, 2).await;

    let client = client_with_app_credentials(&server);
    client.ensure_access_token().await.unwrap();
    client.ensure_access_token().await.unwrap();
}

#[tokio::test]
async fn ensure_without_credentials_sends_requests_unauthenticated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"status": 401, "message": "No token provided"}
        })))
        .mount(&server)
        .await;

    let client = SpotifyClient::new(&config_for(&server)).unwrap();
    client.ensure_access_token().await.unwrap();
    assert!(!client.has_access_token().await);

    let err = client.current_user().await.unwrap_err();
    assert_eq!(err.to_string(), "Spotify API error (401): No token provided");

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.headers.contains_key("authorization")));
}

#[tokio::test]
async fn rejected_grant_reports_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client secret"
        })))
        .mount(&server)
        .await;

    let client = client_with_app_credentials(&server);
    let err = client.ensure_access_token().await.unwrap_err();
    assert!(matches!(err, SpotifyError::Auth { status: 400, .. }));
    assert!(err.to_string().contains("Invalid client secret"));
    assert!(!client.has_access_token().await);
}

#[tokio::test]
async fn grant_without_credentials_is_an_error() {
    let server = MockServer::start().await;
    let client = SpotifyClient::new(&config_for(&server)).unwrap();
    assert!(matches!(
        client.client_credentials_grant().await,
        Err(SpotifyError::MissingCredentials)
    ));
}
