use crate::common::{batch_files, mount_listing_site, read_artifacts};
use listing_courier::config::parse_config;
use listing_courier::model::{
    Credentials, LoginSelectors, PaginationType, SessionLogin,
};
use listing_courier::{
    DeliveryMedium, LoginSpec, MediumConfig, MediumError, MediumKind, SelectorSpec, Termination,
};
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_unknown_medium() {
    let result = DeliveryMedium::create("carrier-pigeon", MediumConfig::new(PaginationType::Next)).await;
    match result {
        Err(MediumError::UnsupportedMedium(name)) => assert_eq!(name, "carrier-pigeon"),
        other => panic!("expected an unsupported medium, got {:?}", other),
    }
}

#[tokio::test]
async fn test_medium_names_and_aliases() {
    for (name, kind) in [
        ("direct-request", MediumKind::DirectRequest),
        ("REQUEST", MediumKind::DirectRequest),
        ("anonymized-request", MediumKind::AnonymizedRequest),
        ("TorRequest", MediumKind::AnonymizedRequest),
    ] {
        let medium = DeliveryMedium::create(name, MediumConfig::new(PaginationType::Next))
            .await
            .unwrap();
        assert_eq!(medium.kind(), kind);
        assert!(!medium.is_logged_in());
    }
}

#[tokio::test]
async fn test_http_medium_rejects_credentials_login() {
    let mut medium = DeliveryMedium::create("request", MediumConfig::new(PaginationType::Next))
        .await
        .unwrap();

    let login = LoginSpec::Credentials(SessionLogin {
        url: "http://localhost:3000/login".to_string(),
        credentials: Credentials {
            user: "test@email.com".to_string(),
            password: "test".to_string(),
        },
        selectors: LoginSelectors {
            user: SelectorSpec::id("username"),
            password: SelectorSpec::id("password"),
            submit: SelectorSpec::id("submit"),
        },
    });
    let result = medium.login(&login).await;
    assert!(matches!(
        result,
        Err(MediumError::LoginSpecMismatch {
            medium: MediumKind::DirectRequest,
            login: "credentials",
        })
    ));
}

#[tokio::test]
async fn test_destroy_without_crawl_writes_nothing() {
    let data = TempDir::new().unwrap();
    let mut medium = DeliveryMedium::create(
        "request",
        MediumConfig::new(PaginationType::Next).data_path(data.path()),
    )
    .await
    .unwrap();

    medium.destroy().await.unwrap();
    assert!(batch_files(data.path()).is_empty());
}

#[tokio::test]
async fn test_config_file_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let data = TempDir::new().unwrap();
    mount_listing_site(&mock_server, 3, 2).await;

    let config = parse_config(&format!(
        r#"
[medium]
kind = "request"
pagination-type = "URL"
pagination-url-template = "{base}/listings/{{PAGE_PARAMETER}}"
flush-after = 3
data-path = "{data}"

[login]
url = "{base}/listings/1"
method = "GET"

[crawl]
first-index-url = "{base}/listings/1"
stop-after = 2

[crawl.selectors.listings]
value = "test-listing"
type = "class"
"#,
        base = base_url,
        data = data.path().display()
    ))
    .unwrap();

    let mut medium = DeliveryMedium::create(
        &config.medium.kind,
        MediumConfig::from_settings(&config.medium),
    )
    .await
    .unwrap();
    medium.login(&config.login).await.unwrap();
    let report = medium.scrape_index_pages(&config.crawl).await.unwrap();
    medium.destroy().await.unwrap();

    assert!(matches!(report.termination, Termination::LimitReached));
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.artifacts_collected, 4);
    assert_eq!(report.batches_written, 2);
    assert_eq!(read_artifacts(data.path()).len(), 4);
}
