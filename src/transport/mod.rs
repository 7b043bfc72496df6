//! Transport capabilities underneath the delivery mediums
//!
//! - `HttpTransport`: reqwest client plus cookie jar, direct or through a relay
//! - `BrowserSession`: trait for a driven browser, implemented by `ChromeSession`

mod chrome;
mod cookies;
mod http;
mod session;

pub use chrome::ChromeSession;
pub use cookies::CookieJar;
pub use http::{build_http_client, HttpResponse, HttpTransport, MAX_REDIRECTS};
pub use session::{BrowserSession, Interaction, POLL_INTERVAL};
