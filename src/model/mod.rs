//! Data model shared by every delivery medium
//!
//! - `SelectorSpec` / `PaginationSpec`: how to find listings and the next index page
//! - `IndexCrawlRequest`: one traversal request
//! - `LoginSpec`: the authentication exchange for each medium family

mod request;
mod selector;

pub use request::{
    Credentials, FormLogin, HttpMethod, IndexCrawlRequest, IndexSelectors, LoginSelectors,
    LoginSpec, RequestOptions, SessionLogin,
};
pub use selector::{PaginationSpec, PaginationType, SelectorKind, SelectorSpec, PAGE_PARAMETER};
