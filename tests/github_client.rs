//! GitHub client behaviour over a scripted transport: request shape,
//! rate-limit retries and error classification.

mod common;

use common::{ok_response, primary_limit, secondary_limit, ScriptedTransport};
use ghsearch::config::GithubConfig;
use ghsearch::search::providers::GithubSearchClient;
use ghsearch::search::transport::HttpResponse;
use ghsearch::search::{page_count, RepositorySearch, SearchError, SearchParams};
use std::sync::Arc;
use std::time::Duration;

fn client(transport: Arc<ScriptedTransport>) -> GithubSearchClient {
    GithubSearchClient::with_transport(GithubConfig::default(), transport)
}

#[tokio::test]
async fn test_search_decodes_items_in_order() {
    let transport = Arc::new(ScriptedTransport::replying(vec![ok_response(
        250,
        &["react", "react-native"],
    )]));

    let page = client(transport.clone())
        .search(&SearchParams::first_page("react"), 10)
        .await
        .unwrap();

    assert_eq!(page.total_count, 250);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "react");
    assert_eq!(page.items[0].visibility, "public");
    assert!(page.items[0].stargazers_count > page.items[1].stargazers_count);
    assert_eq!(page_count(page.total_count, 10), 25);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_selected_page_is_sent_one_based() {
    let transport = Arc::new(ScriptedTransport::replying(vec![ok_response(250, &["react"])]));

    client(transport.clone())
        .search(&SearchParams::new("react", 4), 10)
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert!(request.url.ends_with("/search/repositories"));
    assert_eq!(request.query_value("q"), Some("react"));
    assert_eq!(request.query_value("page"), Some("4"));
    assert_eq!(request.query_value("per_page"), Some("10"));
    assert_eq!(request.query_value("sort"), Some("stars"));
    assert_eq!(request.query_value("order"), Some("desc"));
}

#[tokio::test(start_paused = true)]
async fn test_primary_limit_then_success_makes_two_calls() {
    let transport = Arc::new(ScriptedTransport::replying(vec![
        primary_limit(3),
        ok_response(1, &["tokio"]),
    ]));

    let page = client(transport.clone())
        .search(&SearchParams::first_page("tokio"), 10)
        .await
        .unwrap();

    assert_eq!(page.items[0].name, "tokio");
    assert_eq!(transport.calls(), 2);

    let requests = transport.requests();
    assert_eq!(requests[0], requests[1], "retry must repeat the same request");
}

#[tokio::test(start_paused = true)]
async fn test_repeated_primary_limit_surfaces_failure() {
    let transport = Arc::new(ScriptedTransport::replying(vec![
        primary_limit(3),
        primary_limit(3),
        ok_response(1, &["tokio"]),
    ]));

    let err = client(transport.clone())
        .search(&SearchParams::first_page("tokio"), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::RateLimited { .. }));
    assert!(err.is_user_visible());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_secondary_limit_is_never_retried() {
    let transport = Arc::new(ScriptedTransport::replying(vec![
        secondary_limit(),
        ok_response(1, &["tokio"]),
    ]));

    let err = client(transport.clone())
        .search(&SearchParams::first_page("tokio"), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::SecondaryRateLimited { .. }));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_empty_keyword_never_reaches_the_network() {
    let transport = Arc::new(ScriptedTransport::replying(vec![]));

    let err = client(transport.clone())
        .search(&SearchParams::first_page("   "), 10)
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::EmptyQuery);
    assert!(!err.is_user_visible());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_missing_query_validation_error_is_suppressible() {
    let transport = Arc::new(ScriptedTransport::replying(vec![HttpResponse::new(
        422,
        r#"{"message":"Validation Failed","errors":[{"resource":"Search","field":"q","code":"missing"}],"documentation_url":"https://docs.github.com/v3/search"}"#,
    )]));

    let err = client(transport)
        .search(&SearchParams::first_page("react"), 10)
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::EmptyQuery);
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let transport = Arc::new(ScriptedTransport::replying(vec![HttpResponse::new(
        503,
        r#"{"message":"Service Unavailable"}"#,
    )]));

    let err = client(transport)
        .search(&SearchParams::first_page("react"), 10)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API error (503): Service Unavailable");
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let transport = Arc::new(ScriptedTransport::replying(vec![HttpResponse::new(
        200,
        "<html>not json</html>",
    )]));

    let err = client(transport)
        .search(&SearchParams::first_page("react"), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Decode(_)));
}

#[tokio::test]
async fn test_network_error_propagates() {
    let transport = Arc::new(ScriptedTransport::new(vec![Err(SearchError::Network(
        "connection refused".into(),
    ))]));

    let err = client(transport)
        .search(&SearchParams::first_page("react"), 10)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Network error: connection refused");
}

#[tokio::test(start_paused = true)]
async fn test_retry_waits_the_indicated_delay() {
    let transport = Arc::new(ScriptedTransport::replying(vec![
        primary_limit(30),
        ok_response(1, &["serde"]),
    ]));
    let started = tokio::time::Instant::now();

    client(transport)
        .search(&SearchParams::first_page("serde"), 10)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_wait_longer_than_ceiling_fails_fast() {
    let transport = Arc::new(ScriptedTransport::replying(vec![
        primary_limit(3600),
        ok_response(1, &["serde"]),
    ]));
    let config = GithubConfig {
        max_retry_wait_secs: 60,
        ..GithubConfig::default()
    };

    let err = GithubSearchClient::with_transport(config, transport.clone())
        .search(&SearchParams::first_page("serde"), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::RateLimited { .. }));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_authorization_header_only_with_token() {
    let anonymous = Arc::new(ScriptedTransport::replying(vec![ok_response(0, &[])]));
    client(anonymous.clone())
        .search(&SearchParams::first_page("x"), 10)
        .await
        .unwrap();
    assert_eq!(anonymous.requests()[0].header_value("authorization"), None);

    let authed = Arc::new(ScriptedTransport::replying(vec![ok_response(0, &[])]));
    let config = GithubConfig {
        token: Some("ghp_testtoken".to_string()),
        ..GithubConfig::default()
    };
    GithubSearchClient::with_transport(config, authed.clone())
        .search(&SearchParams::first_page("x"), 10)
        .await
        .unwrap();
    assert_eq!(
        authed.requests()[0].header_value("authorization"),
        Some("Bearer ghp_testtoken")
    );
}
