//! `wikisync_core` turns a tree of card-game design data into wiki pages.
//!
//! ## Processing Pipeline
//!
//! ```text
//! contents.json (per directory)
//!   → Indexer (builds the node tree, resolving templates top-down)
//!   → Uploader (filters renderable nodes in pre-order)
//!   → Node render (lazy data load → pre-renderer → template)
//!   → tmp/ output and/or the remote wiki
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `wikisync.toml` loading and the project path layout.
//! - [`pre_render`]: data transformations applied before templating.
//!
//! ## Key Types
//!
//! - [`WikiIndexer`]: builds a [`WikiTree`] from the root index file.
//! - [`WikiNode`]: a directory or document, rendered through a shared
//!   [`Template`].
//! - [`WikiUploader`]: renders selected nodes, saves them and publishes them
//!   through a [`WikiClient`].
//! - [`WikiSynchronizer`]: splits design-data card files into per-card data
//!   files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wikisync_core::HtmlPreRenderer;
//! use wikisync_core::WikiConfig;
//! use wikisync_core::WikiPaths;
//! use wikisync_core::WikiUploader;
//!
//! let paths = WikiPaths::new(".");
//! let config = WikiConfig::load_or_default(&paths.root).unwrap();
//! let mut uploader =
//! 	WikiUploader::new(paths, &config, Some(Box::new(HtmlPreRenderer::default()))).unwrap();
//!
//! let only_cards = |node: &wikisync_core::WikiNode| node.name.contains("card");
//! let report = uploader.upload(true, false, Some(&only_cards)).unwrap();
//! println!("rendered {} of {} pages", report.processed, report.total);
//! ```

pub use client::*;
pub use config::*;
pub use error::*;
pub use html_parts::*;
pub use indexer::*;
pub use node::*;
pub use pre_render::*;
pub use synchronizer::*;
pub use template::*;
pub use uploader::*;

mod client;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod html_parts;
mod indexer;
mod node;
pub mod pre_render;
mod synchronizer;
mod template;
mod uploader;

#[cfg(test)]
mod __fixtures;
