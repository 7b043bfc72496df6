use crate::common::{
    batch_sizes, detail_page, html, index_page, mount_listing_site, read_artifacts,
    FixtureBrowser,
};
use listing_courier::config::BrowserSettings;
use listing_courier::model::{
    Credentials, FormLogin, HttpMethod, LoginSelectors, PaginationType, RequestOptions,
    SessionLogin,
};
use listing_courier::{
    CrawlError, DeliveryMedium, IndexCrawlRequest, LoginSpec, MediumConfig, MediumError,
    MediumKind, SelectorSpec, Termination, TransportError,
};
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PAGE: &str = r#"<html><body><form>
<input id="username" name="username">
<input id="password" name="password" type="password">
<button id="submit" type="submit">Sign in</button>
</form></body></html>"#;

fn browser_settings(wait_timeout_ms: u64) -> BrowserSettings {
    BrowserSettings {
        wait_timeout_ms,
        ..BrowserSettings::default()
    }
}

fn session_login(base_url: &str) -> LoginSpec {
    LoginSpec::Credentials(SessionLogin {
        url: format!("{}/login", base_url),
        credentials: Credentials {
            user: "test@email.com".to_string(),
            password: "test".to_string(),
        },
        selectors: LoginSelectors {
            user: SelectorSpec::id("username"),
            password: SelectorSpec::id("password"),
            submit: SelectorSpec::id("submit"),
        },
    })
}

async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html(LOGIN_PAGE.to_string()))
        .mount(server)
        .await;
}

fn listings_request(base_url: &str) -> IndexCrawlRequest {
    IndexCrawlRequest::new(
        format!("{}/listings/1", base_url),
        SelectorSpec::css(".test-listing"),
    )
}

#[tokio::test]
async fn test_login_fills_the_form() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_login_page(&mock_server).await;

    let (browser, log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next).browser(browser_settings(1_000));
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    assert_eq!(medium.kind(), MediumKind::DrivenSession);

    medium.login(&session_login(&base_url)).await.unwrap();
    assert!(medium.is_logged_in());

    let log = log.lock().unwrap();
    assert_eq!(
        log.typed,
        vec![
            ("username".to_string(), "test@email.com".to_string()),
            ("password".to_string(), "test".to_string()),
        ]
    );
    assert_eq!(log.pressed, vec!["submit".to_string()]);
}

#[tokio::test]
async fn test_login_page_without_user_field() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("<html><body>Maintenance</body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next).browser(browser_settings(200));
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();

    let result = medium.login(&session_login(&base_url)).await;
    assert!(matches!(
        result,
        Err(MediumError::Transport(TransportError::ElementNotFound(_)))
    ));
    assert!(!medium.is_logged_in());
}

#[tokio::test]
async fn test_session_rejects_form_login() {
    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next);
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();

    let result = medium
        .login(&LoginSpec::Form(FormLogin {
            url: "http://localhost:3000/".to_string(),
            options: RequestOptions::default(),
            method: HttpMethod::Post,
        }))
        .await;
    assert!(matches!(
        result,
        Err(MediumError::LoginSpecMismatch {
            medium: MediumKind::DrivenSession,
            ..
        })
    ));
}

#[tokio::test]
async fn test_clicking_next_matches_url_template() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_login_page(&mock_server).await;
    mount_listing_site(&mock_server, 2, 3).await;

    let next_data = TempDir::new().unwrap();
    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next)
        .browser(browser_settings(500))
        .data_path(next_data.path());
    let mut by_click = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    by_click.login(&session_login(&base_url)).await.unwrap();
    let click_report = by_click
        .scrape_index_pages(
            &listings_request(&base_url).with_next_page(SelectorSpec::css(".test-next-page")),
        )
        .await
        .unwrap();

    let url_data = TempDir::new().unwrap();
    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Url)
        .url_template(format!("{}/listings/{{PAGE_PARAMETER}}", base_url))
        .browser(browser_settings(500))
        .data_path(url_data.path());
    let mut by_url = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    by_url.login(&session_login(&base_url)).await.unwrap();
    let url_report = by_url
        .scrape_index_pages(&listings_request(&base_url))
        .await
        .unwrap();

    assert!(matches!(click_report.termination, Termination::Exhausted));
    assert!(matches!(url_report.termination, Termination::Exhausted));
    assert_eq!(click_report.pages_visited, 2);
    assert_eq!(url_report.pages_visited, 2);

    let artifacts = read_artifacts(next_data.path());
    assert_eq!(artifacts.len(), 6);
    assert_eq!(artifacts[0], Value::String(detail_page("1-1")));
    assert_eq!(artifacts, read_artifacts(url_data.path()));
}

#[tokio::test]
async fn test_unclickable_listing_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let data = TempDir::new().unwrap();
    mount_login_page(&mock_server).await;

    let index = r#"<html><body>
<div class="test-listing"><a href="/items/1">One</a></div>
<div class="test-listing" data-broken="true"><a href="/items/2">Two</a></div>
<div class="test-listing"><a href="/items/3">Three</a></div>
</body></html>"#;
    Mock::given(method("GET"))
        .and(path("/listings/1"))
        .respond_with(html(index.to_string()))
        .mount(&mock_server)
        .await;
    for item in ["1", "3"] {
        Mock::given(method("GET"))
            .and(path(format!("/items/{}", item)))
            .respond_with(html(detail_page(item)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/items/2"))
        .respond_with(html(detail_page("2")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next)
        .browser(browser_settings(500))
        .data_path(data.path());
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    let report = medium
        .scrape_index_pages(
            &listings_request(&base_url)
                .with_next_page(SelectorSpec::css(".test-next-page"))
                .stop_after(1),
        )
        .await
        .unwrap();

    assert!(matches!(report.termination, Termination::LimitReached));
    assert_eq!(report.artifacts_collected, 2);
    assert_eq!(
        read_artifacts(data.path()),
        vec![
            Value::String(detail_page("1")),
            Value::String(detail_page("3")),
        ]
    );
}

#[tokio::test]
async fn test_session_flush_boundaries() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let data = TempDir::new().unwrap();
    mount_login_page(&mock_server).await;
    mount_listing_site(&mock_server, 2, 3).await;

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next)
        .browser(browser_settings(500))
        .flush_after(2)
        .data_path(data.path());
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    let report = medium
        .scrape_index_pages(
            &listings_request(&base_url).with_next_page(SelectorSpec::css(".test-next-page")),
        )
        .await
        .unwrap();

    assert!(matches!(report.termination, Termination::Exhausted));
    assert_eq!(report.artifacts_collected, 6);
    assert_eq!(report.batches_written, 3);
    assert_eq!(batch_sizes(data.path()), vec![2, 2, 2]);
}

#[tokio::test]
async fn test_skipped_listing_keeps_batch_boundaries() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let data = TempDir::new().unwrap();
    mount_login_page(&mock_server).await;

    let index = r#"<html><body>
<div class="test-listing"><a href="/items/1">One</a></div>
<div class="test-listing" data-broken="true"><a href="/items/2">Two</a></div>
<div class="test-listing"><a href="/items/3">Three</a></div>
<div class="test-listing"><a href="/items/4">Four</a></div>
</body></html>"#;
    Mock::given(method("GET"))
        .and(path("/listings/1"))
        .respond_with(html(index.to_string()))
        .mount(&mock_server)
        .await;
    for item in ["1", "3", "4"] {
        Mock::given(method("GET"))
            .and(path(format!("/items/{}", item)))
            .respond_with(html(detail_page(item)))
            .mount(&mock_server)
            .await;
    }

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next)
        .browser(browser_settings(500))
        .flush_after(2)
        .data_path(data.path());
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    let report = medium
        .scrape_index_pages(
            &listings_request(&base_url)
                .with_next_page(SelectorSpec::css(".test-next-page"))
                .stop_after(1),
        )
        .await
        .unwrap();

    assert!(matches!(report.termination, Termination::LimitReached));
    assert_eq!(report.artifacts_collected, 3);
    assert_eq!(batch_sizes(data.path()), vec![2, 1]);
    assert_eq!(
        read_artifacts(data.path()),
        vec![
            Value::String(detail_page("1")),
            Value::String(detail_page("3")),
            Value::String(detail_page("4")),
        ]
    );
}

#[tokio::test]
async fn test_listings_that_never_appear_exhaust_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_login_page(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/listings/1"))
        .respond_with(html(index_page(&[], None)))
        .mount(&mock_server)
        .await;

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next).browser(browser_settings(150));
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    let report = medium
        .scrape_index_pages(
            &listings_request(&base_url).with_next_page(SelectorSpec::css(".test-next-page")),
        )
        .await
        .unwrap();

    assert!(matches!(report.termination, Termination::Exhausted));
    assert_eq!(report.pages_visited, 0);
    assert_eq!(report.batches_written, 0);
}

#[tokio::test]
async fn test_lost_index_page_fails_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let data = TempDir::new().unwrap();
    mount_login_page(&mock_server).await;

    // The index page is served once; coming back to it after the first listing fails
    Mock::given(method("GET"))
        .and(path("/listings/1"))
        .respond_with(html(index_page(&["1", "2"], None)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(html(detail_page("1")))
        .mount(&mock_server)
        .await;

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next)
        .browser(browser_settings(150))
        .data_path(data.path());
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    let report = medium
        .scrape_index_pages(
            &listings_request(&base_url).with_next_page(SelectorSpec::css(".test-next-page")),
        )
        .await
        .unwrap();

    assert!(matches!(
        report.termination,
        Termination::Failed(CrawlError::Transport(TransportError::Status { status: 404, .. }))
    ));
    assert_eq!(read_artifacts(data.path()), vec![Value::String(detail_page("1"))]);
}

#[tokio::test]
async fn test_destroy_closes_the_browser_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_login_page(&mock_server).await;

    let (browser, log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next);
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    medium.destroy().await.unwrap();
    medium.destroy().await.unwrap();
    assert_eq!(log.lock().unwrap().closes, 1);

    let result = medium.scrape_index_pages(&listings_request(&base_url)).await;
    assert!(matches!(result, Err(MediumError::Destroyed)));
}

#[tokio::test]
async fn test_invalid_browser_settings_rejected() {
    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next).browser(browser_settings(0));
    let result = DeliveryMedium::with_browser_session(config, Box::new(browser));
    assert!(matches!(result, Err(MediumError::Config(_))));
}

#[tokio::test]
async fn test_unreachable_index_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_login_page(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/listings/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (browser, _log) = FixtureBrowser::new();
    let config = MediumConfig::new(PaginationType::Next);
    let mut medium = DeliveryMedium::with_browser_session(config, Box::new(browser)).unwrap();
    medium.login(&session_login(&base_url)).await.unwrap();

    let report = medium
        .scrape_index_pages(
            &listings_request(&base_url).with_next_page(SelectorSpec::css(".test-next-page")),
        )
        .await
        .unwrap();
    assert!(!report.is_success());
}
