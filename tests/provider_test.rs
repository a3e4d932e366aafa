//! Provider client behavior against a mock HTTP server: response parsing,
//! empty-on-failure semantics, and URL construction details.

use reelcache::config::ProviderConfig;
use reelcache::provider::{MovieProvider, RottenTomatoesClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RottenTomatoesClient {
    RottenTomatoesClient::new(&ProviderConfig {
        server: server.uri(),
        api_version: "v1.0".to_string(),
        api_key: "testkey".to_string(),
        timeout_secs: 5,
    })
}

#[tokio::test]
async fn search_parses_hits_with_string_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "movies": [
                {"id": "770672122", "title": "Up", "year": 2009},
                {"id": 770671912, "title": "Up in the Air", "year": 2009}
            ]
        })))
        .mount(&server)
        .await;

    let hits = client_for(&server).search("up 2009", None, None).await;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, Some(770672122));
    assert_eq!(hits[1].id, Some(770671912));
}

#[tokio::test]
async fn search_with_zero_total_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total": 0, "movies": []})),
        )
        .mount(&server)
        .await;

    let hits = client_for(&server).search("nothing", None, None).await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_transport_failure_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let hits = client_for(&server).search("up", None, None).await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_invalid_json_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>tilt</html>"))
        .mount(&server)
        .await;

    let hits = client_for(&server).search("up", None, None).await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn search_sends_pagination_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies.json"))
        .and(query_param("page_limit", "5"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "movies": [{"id": 1, "title": "Up"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hits = client_for(&server).search("up", Some(5), Some(2)).await;
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn movie_info_without_id_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies/5.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Phantom"})))
        .mount(&server)
        .await;

    assert!(client_for(&server).movie_info(5).await.is_none());
}

#[tokio::test]
async fn movie_info_with_id_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movies/770672122.json"))
        .and(query_param("apikey", "testkey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 770672122,
            "title": "Up",
            "year": 2009,
            "ratings": {"critics_score": 98}
        })))
        .mount(&server)
        .await;

    let payload = client_for(&server).movie_info(770672122).await.unwrap();
    assert_eq!(payload.title.as_deref(), Some("Up"));
    assert_eq!(payload.ratings.unwrap().critics_score, Some(98));
}

#[tokio::test]
async fn movie_alias_strips_imdb_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/movie_alias.json"))
        .and(query_param("id", "1049413"))
        .and(query_param("type", "imdb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 770672122,
            "title": "Up",
            "year": 2009
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client_for(&server)
        .movie_alias("tt1049413", "imdb")
        .await
        .unwrap();
    assert_eq!(payload.id, Some(770672122));
}

#[tokio::test]
async fn list_translates_spaces_to_underscores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/lists/dvds/new_releases.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movies": [{"id": 1, "title": "Up"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let movies = client_for(&server)
        .list("dvds", "new releases", "us", 20, 20, None)
        .await;
    assert_eq!(movies.len(), 1);
}

#[tokio::test]
async fn list_with_no_movies_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/lists/movies/box_office.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"movies": []})))
        .mount(&server)
        .await;

    let movies = client_for(&server)
        .list("movies", "box office", "us", 20, 20, None)
        .await;
    assert!(movies.is_empty());
}
