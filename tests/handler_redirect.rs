mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;

use common::{
    FixedGeoResolver, MockConnectInfoLayer, create_default_state, create_test_state, make_link,
    make_target,
};
use smart_redirect::api::handlers::redirect_handler;
use smart_redirect::domain::access_event::AccessOutcome;
use smart_redirect::infrastructure::persistence::MemoryLinkRepository;
use smart_redirect::state::AppState;

fn test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route(
            "/{version}/{business_unit}/{link_code}",
            get(redirect_handler),
        )
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_redirect_success() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &[])],
        None,
    ));
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server.get("/v1/bu/df7fca").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/t1");
}

#[tokio::test]
async fn test_redirect_unknown_code_not_found() {
    let repo = Arc::new(MemoryLinkRepository::new());
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server.get("/v1/bu/nosuch").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_inactive_link_not_found() {
    let repo = Arc::new(MemoryLinkRepository::new());
    let mut link = make_link("df7fca", vec![make_target(1, 10, 0, &[])], None);
    link.is_active = false;
    repo.add_link(link);
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server.get("/v1/bu/df7fca").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_unknown_version_not_found() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &[])],
        None,
    ));
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server.get("/v2/bu/df7fca").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_transforms_parameters() {
    let repo = Arc::new(MemoryLinkRepository::new());
    let mut target = make_target(1, 10, 0, &[]);
    target.param_mapping = HashMap::from([("src".to_string(), "referrer".to_string())]);
    target.static_params = HashMap::from([("campaign".to_string(), "summer".to_string())]);
    repo.add_link(make_link("df7fca", vec![target], None));
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server
        .get("/v1/bu/df7fca")
        .add_query_param("src", "google")
        .add_query_param("campaign", "ignored")
        .await;

    assert_eq!(response.status_code(), 302);
    let location = response.header("location");
    let url = url::Url::parse(location.to_str().unwrap()).unwrap();
    let query: HashMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    assert_eq!(query.get("referrer").map(String::as_str), Some("google"));
    assert_eq!(query.get("campaign").map(String::as_str), Some("summer"));
    assert!(!query.contains_key("src"));
}

#[tokio::test]
async fn test_redirect_backup_fallback_passes_query_through() {
    let repo = Arc::new(MemoryLinkRepository::new());
    // The only target is country-restricted and geo lookups are disabled,
    // so nothing is eligible and the backup takes over
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &["DE"])],
        Some("https://backup.example.com/"),
    ));
    let (state, _rx) = create_default_state(repo.clone());
    let server = test_server(state);

    let response = server
        .get("/v1/bu/df7fca")
        .add_query_param("src", "google")
        .await;

    assert_eq!(response.status_code(), 302);
    let location = response.header("location");
    let location = location.to_str().unwrap();
    assert!(location.starts_with("https://backup.example.com/"));
    assert!(location.contains("src=google"));

    // Backup fallback consumes no target capacity
    assert_eq!(repo.target_hits(1), Some(0));
}

#[tokio::test]
async fn test_redirect_country_restricted_target_served_to_matching_client() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &["DE"])],
        None,
    ));
    let (state, _rx) = create_test_state(
        repo,
        1000,
        Arc::new(FixedGeoResolver(Some("DE".to_string()))),
    );
    let server = test_server(state);

    let response = server.get("/v1/bu/df7fca").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/t1");
}

#[tokio::test]
async fn test_rate_limited_excess_gets_429_and_consumes_no_capacity() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &[])],
        None,
    ));
    let (state, _rx) = create_test_state(
        repo.clone(),
        3,
        Arc::new(smart_redirect::infrastructure::geo::DisabledGeoResolver::new()),
    );
    let server = test_server(state);

    for _ in 0..3 {
        let response = server
            .get("/v1/bu/df7fca")
            .add_header("X-Real-IP", "203.0.113.9")
            .await;
        assert_eq!(response.status_code(), 302);
    }

    for _ in 0..2 {
        let response = server
            .get("/v1/bu/df7fca")
            .add_header("X-Real-IP", "203.0.113.9")
            .await;
        assert_eq!(response.status_code(), 429);
    }

    // Only the admitted requests consumed capacity
    assert_eq!(repo.target_hits(1), Some(3));

    // A different client is unaffected
    let response = server
        .get("/v1/bu/df7fca")
        .add_header("X-Real-IP", "198.51.100.7")
        .await;
    assert_eq!(response.status_code(), 302);
}

#[tokio::test]
async fn test_sticky_repeat_visits_get_same_location() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 50, 0, &[]), make_target(2, 50, 0, &[])],
        None,
    ));
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let first = server
        .get("/v1/bu/df7fca")
        .add_header("X-Real-IP", "203.0.113.9")
        .await;
    assert_eq!(first.status_code(), 302);
    let first_location = first.header("location");

    for _ in 0..10 {
        let next = server
            .get("/v1/bu/df7fca")
            .add_header("X-Real-IP", "203.0.113.9")
            .await;
        assert_eq!(next.header("location"), first_location);
    }
}

#[tokio::test]
async fn test_redirect_records_access_event() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &[])],
        None,
    ));
    let (state, mut rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server
        .get("/v1/bu/df7fca")
        .add_header("X-Real-IP", "203.0.113.9")
        .add_header("User-Agent", "TestBot/1.0")
        .add_header("Referer", "https://google.com")
        .await;

    assert_eq!(response.status_code(), 302);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.target_id, Some(1));
    assert_eq!(event.outcome, AccessOutcome::Target);
    assert_eq!(event.ip, "203.0.113.9");
    assert_eq!(event.user_agent.as_deref(), Some("TestBot/1.0"));
    assert_eq!(event.referer.as_deref(), Some("https://google.com"));
}

#[tokio::test]
async fn test_backup_fallback_records_backup_outcome() {
    let repo = Arc::new(MemoryLinkRepository::new());
    repo.add_link(make_link(
        "df7fca",
        vec![make_target(1, 10, 0, &["DE"])],
        Some("https://backup.example.com/"),
    ));
    let (state, mut rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server.get("/v1/bu/df7fca").await;
    assert_eq!(response.status_code(), 302);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.target_id, None);
    assert_eq!(event.outcome, AccessOutcome::Backup);
}

#[tokio::test]
async fn test_exhausted_pool_without_backup_is_unavailable() {
    let repo = Arc::new(MemoryLinkRepository::new());
    let mut target = make_target(1, 10, 5, &[]);
    target.current_hits = 5;
    repo.add_link(make_link("df7fca", vec![target], None));
    let (state, _rx) = create_default_state(repo);
    let server = test_server(state);

    let response = server.get("/v1/bu/df7fca").await;

    assert_eq!(response.status_code(), 503);
}
