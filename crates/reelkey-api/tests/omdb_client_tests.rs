//! OMDb client tests against a mock HTTP server.

use reelkey_api::{MetadataService, OmdbClient, OmdbError};
use reelkey_parse::MediaKind;
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OmdbClient {
    OmdbClient::new("test-key".into()).with_base_url(format!("{}/", server.uri()))
}

fn matrix_page(n: usize) -> serde_json::Value {
    let items: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "Title": format!("The Matrix {i}"),
                "Year": "1999",
                "imdbID": format!("tt01330{i:02}"),
                "Type": "movie",
                "Poster": "N/A"
            })
        })
        .collect();
    json!({ "Search": items, "totalResults": n.to_string(), "Response": "True" })
}

#[tokio::test]
async fn test_search_sends_expected_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("s", "Matrix"))
        .and(query_param("page", "1"))
        .and(query_param("r", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(matrix_page(2)))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server).search_titles("  Matrix ", None).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "tt0133000");
    assert_eq!(results[0].kind, Some(MediaKind::Movie));
}

#[tokio::test]
async fn test_search_with_type_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("s", "Dark"))
        .and(query_param("type", "series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Search": [{"Title": "Dark", "Year": "2017–2020", "imdbID": "tt5753856", "Type": "series", "Poster": "N/A"}],
            "totalResults": "1",
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let results = client(&server)
        .search_titles("Dark", Some(MediaKind::Series))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, Some(MediaKind::Series));
}

#[tokio::test]
async fn test_search_truncates_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(matrix_page(10)))
        .mount(&server)
        .await;

    let results = client(&server).search_titles("Matrix", None).await.unwrap();
    assert_eq!(results.len(), 8);

    let results = client(&server)
        .with_max_results(3)
        .search_titles("Matrix", None)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_search_api_error_is_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Response": "False", "Error": "Movie not found!"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).search_titles("zzzzzz", None).await.unwrap_err();
    assert!(matches!(err, OmdbError::Response(ref m) if m == "Movie not found!"));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_invalid_key_reported_from_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"Response": "False", "Error": "Invalid API key!"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).search_titles("Matrix", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid API key!");
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).search_titles("Matrix", None).await.unwrap_err();
    assert!(matches!(err, OmdbError::Api { status: 503, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).search_titles("Matrix", None).await.unwrap_err();
    assert!(matches!(err, OmdbError::Parse(_)));
}

#[tokio::test]
async fn test_empty_query_skips_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(matrix_page(1)))
        .expect(0)
        .mount(&server)
        .await;

    let results = client(&server).search_titles("   ", None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_missing_key() {
    let server = MockServer::start().await;
    let client = OmdbClient::new("  ".into()).with_base_url(server.uri());

    let err = client.search_titles("Matrix", None).await.unwrap_err();
    assert!(matches!(err, OmdbError::MissingApiKey));
    let err = client.get_title("tt0133093").await.unwrap_err();
    assert!(matches!(err, OmdbError::MissingApiKey));
}

#[tokio::test]
async fn test_get_title() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("i", "tt0133093"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "The Matrix",
            "Year": "1999",
            "Runtime": "136 min",
            "Genre": "Action, Sci-Fi",
            "Plot": "A computer hacker learns about the true nature of reality.",
            "Poster": "https://m.media-amazon.com/images/M/matrix.jpg",
            "imdbRating": "8.7",
            "imdbID": "tt0133093",
            "Type": "movie",
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let details = client(&server).get_title("tt0133093").await.unwrap();
    assert_eq!(details.title, "The Matrix");
    assert_eq!(details.kind, Some(MediaKind::Movie));
    assert_eq!(details.runtime.as_deref(), Some("136 min"));
}

#[tokio::test]
async fn test_get_title_rejects_blank_id() {
    let server = MockServer::start().await;
    let err = client(&server).get_title(" ").await.unwrap_err();
    assert!(matches!(err, OmdbError::InvalidInput(_)));
}

#[tokio::test]
async fn test_get_title_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Response": "False", "Error": "Incorrect IMDb ID."})),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_title("tt0").await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect IMDb ID.");
}
