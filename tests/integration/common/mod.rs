//! Shared fixtures for the integration tests
//!
//! The listing site is served by wiremock: `/listings/<n>` are index pages carrying
//! `.test-listing` entries and a `.test-next-page` link, `/items/<id>` are detail pages.

use async_trait::async_trait;
use listing_courier::model::SelectorSpec;
use listing_courier::transport::{BrowserSession, Interaction};
use listing_courier::TransportError;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders an index page whose listings link to `items`
pub fn index_page(items: &[&str], next: Option<&str>) -> String {
    let listings: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<div class="test-listing"><a href="/items/{}">Item {}</a></div>"#,
                item, item
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a class="test-next-page" href="{}">Next</a>"#, href))
        .unwrap_or_default();

    format!(
        "<html><head><title>Listings</title></head><body>{}{}</body></html>",
        listings, next
    )
}

pub fn detail_page(item: &str) -> String {
    format!(
        r#"<html><head><title>Item {0}</title></head><body><h1 class="title">Item {0}</h1></body></html>"#,
        item
    )
}

pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Mounts `pages` index pages with `per_page` listings each, plus an empty page after them
///
/// Listing ids are `<page>-<position>`, so every detail page is distinct.
pub async fn mount_listing_site(server: &MockServer, pages: usize, per_page: usize) {
    for page in 1..=pages + 1 {
        let body = if page <= pages {
            let ids: Vec<String> = (1..=per_page).map(|i| format!("{}-{}", page, i)).collect();
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            index_page(&ids, Some(&format!("/listings/{}", page + 1)))
        } else {
            index_page(&[], None)
        };
        Mock::given(method("GET"))
            .and(path(format!("/listings/{}", page)))
            .respond_with(html(body))
            .mount(server)
            .await;

        if page <= pages {
            for i in 1..=per_page {
                let id = format!("{}-{}", page, i);
                Mock::given(method("GET"))
                    .and(path(format!("/items/{}", id)))
                    .respond_with(html(detail_page(&id)))
                    .mount(server)
                    .await;
            }
        }
    }
}

/// Every batch file under `dir`, in write order
pub fn batch_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    files.sort();
    files
}

pub fn read_batches(dir: &Path) -> Vec<Vec<Value>> {
    batch_files(dir)
        .iter()
        .map(|file| serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap())
        .collect()
}

/// All artifacts written under `dir`, across batches
pub fn read_artifacts(dir: &Path) -> Vec<Value> {
    read_batches(dir).into_iter().flatten().collect()
}

pub fn batch_sizes(dir: &Path) -> Vec<usize> {
    read_batches(dir).iter().map(Vec::len).collect()
}

/// Extracts the `<h1>` text of a detail page
pub fn title_of(page: &str) -> Value {
    let document = Html::parse_document(page);
    let selector = Selector::parse("h1").unwrap();
    document
        .select(&selector)
        .next()
        .map(|h1| Value::String(h1.text().collect::<String>()))
        .unwrap_or(Value::Null)
}

/// What a `FixtureBrowser` was asked to do
#[derive(Debug, Default)]
pub struct BrowserLog {
    pub visited: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub pressed: Vec<String>,
    pub closes: usize,
}

/// A browser session over plain HTTP and a static DOM
///
/// Clicking an element follows its own or its first descendant's anchor. Elements marked
/// `data-broken` refuse clicks, other elements without an anchor record the click and
/// stay on the page.
pub struct FixtureBrowser {
    client: reqwest::Client,
    url: String,
    source: String,
    log: Arc<Mutex<BrowserLog>>,
}

impl FixtureBrowser {
    pub fn new() -> (Self, Arc<Mutex<BrowserLog>>) {
        let log = Arc::new(Mutex::new(BrowserLog::default()));
        let browser = Self {
            client: reqwest::Client::new(),
            url: "about:blank".to_string(),
            source: String::new(),
            log: log.clone(),
        };
        (browser, log)
    }

    fn css(selector: &SelectorSpec) -> Result<Selector, TransportError> {
        let css = selector.to_css()?;
        Selector::parse(&css).map_err(|e| TransportError::Browser(e.to_string()))
    }

    fn href_of(element: ElementRef<'_>) -> Option<String> {
        if let Some(href) = element.value().attr("href") {
            return Some(href.to_string());
        }
        let anchor = Selector::parse("a[href]").unwrap();
        element
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    }
}

#[async_trait]
impl BrowserSession for FixtureBrowser {
    async fn navigate(&mut self, url: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Browser(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        self.url = response.url().to_string();
        self.source = response
            .text()
            .await
            .map_err(|e| TransportError::Browser(e.to_string()))?;
        self.log.lock().unwrap().visited.push(self.url.clone());
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, TransportError> {
        Ok(self.url.clone())
    }

    async fn page_source(&mut self) -> Result<String, TransportError> {
        Ok(self.source.clone())
    }

    async fn locate_elements(&mut self, selector: &SelectorSpec) -> Result<usize, TransportError> {
        let css = Self::css(selector)?;
        Ok(Html::parse_document(&self.source).select(&css).count())
    }

    async fn interact(
        &mut self,
        selector: &SelectorSpec,
        index: usize,
        interaction: Interaction,
    ) -> Result<(), TransportError> {
        let target = {
            let css = Self::css(selector)?;
            let document = Html::parse_document(&self.source);
            let element = document
                .select(&css)
                .nth(index)
                .ok_or_else(|| TransportError::ElementNotFound(format!("{} #{}", selector, index)))?;

            if element.value().attr("data-broken").is_some() {
                return Err(TransportError::Browser(format!(
                    "{} #{} is not clickable",
                    selector, index
                )));
            }
            Self::href_of(element)
        };

        match interaction {
            Interaction::Type(text) => {
                self.log
                    .lock()
                    .unwrap()
                    .typed
                    .push((selector.locator.clone(), text));
                Ok(())
            }
            Interaction::Click => match target {
                Some(href) => {
                    let next = url::Url::parse(&self.url)
                        .and_then(|base| base.join(&href))
                        .map_err(|e| TransportError::Browser(e.to_string()))?;
                    self.navigate(next.as_str()).await
                }
                None => {
                    self.log
                        .lock()
                        .unwrap()
                        .pressed
                        .push(selector.locator.clone());
                    Ok(())
                }
            },
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}
