//! `wikisync_graphql` talks to a Wiki.js instance over its GraphQL API.
//!
//! [`WikiJsClient`] exposes the page operations the wiki offers and
//! implements [`wikisync_core::WikiClient`] so an uploader can publish
//! through it:
//!
//! ```rust,no_run
//! use wikisync_graphql::WikiJsClient;
//!
//! let client = WikiJsClient::new("https://wiki.example.com", Some("token".into())).unwrap();
//! if let Some(page) = client.get_page_by_path("home", "zh").unwrap() {
//! 	println!("{} is page {}", page.path, page.id);
//! }
//! ```

pub use client::*;
pub use error::*;
pub use types::*;

mod client;
mod error;
pub mod queries;
mod types;
