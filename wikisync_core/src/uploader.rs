use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::NewPage;
use crate::NodeId;
use crate::OutputKind;
use crate::PageUpdate;
use crate::PreRenderer;
use crate::PublishConfig;
use crate::WikiClient;
use crate::WikiConfig;
use crate::WikiError;
use crate::WikiIndexer;
use crate::WikiNode;
use crate::WikiPaths;
use crate::WikiResult;
use crate::WikiTree;
use crate::extract_html_parts;

/// Remote path used for a root directory that carries its own data.
pub const HOME_PAGE_PATH: &str = "home";

/// Selects which nodes an upload processes.
pub type NodeFilter<'a> = &'a dyn Fn(&WikiNode) -> bool;

/// The default filter: selects nothing, so callers have to opt in.
pub fn reject_all(_node: &WikiNode) -> bool {
	false
}

/// Counts reported by [`WikiUploader::upload`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
	/// Renderable nodes in the tree.
	pub total: usize,
	/// Nodes accepted by the filter and rendered.
	pub processed: usize,
	/// Rendered files written to the output directory.
	pub saved: usize,
	/// Pages published to the remote wiki.
	pub uploaded: usize,
	/// Paths of the written files, in processing order.
	pub saved_files: Vec<PathBuf>,
}

/// Where and how a node is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
	pub path: String,
	pub title: String,
	pub tags: Vec<String>,
}

impl PageMeta {
	/// Metadata for `id`, preferring a `wiki` object in the node's data over
	/// values derived from the tree.
	pub fn for_node(tree: &WikiTree, id: NodeId, defaults: &PublishConfig) -> Self {
		let node = tree.get(id);
		let data = node.data.as_ref();
		let wiki = data.and_then(|data| data.get("wiki"));
		let wiki_str = |key: &str| {
			wiki.and_then(|wiki| wiki.get(key))
				.and_then(Value::as_str)
				.map(str::to_string)
		};

		let path = wiki_str("path").unwrap_or_else(|| {
			let names = tree.node_path(id);
			if names.is_empty() {
				HOME_PAGE_PATH.to_string()
			} else {
				names.join("/")
			}
		});
		let title = wiki_str("title")
			.or_else(|| {
				data.and_then(|data| data.get("title"))
					.and_then(Value::as_str)
					.map(str::to_string)
			})
			.unwrap_or_else(|| node.name.clone());
		let tags = wiki
			.and_then(|wiki| wiki.get("tags"))
			.and_then(Value::as_array)
			.map(|tags| {
				tags.iter()
					.filter_map(Value::as_str)
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_else(|| defaults.tags.clone());

		Self { path, title, tags }
	}
}

/// Renders selected nodes of an index and saves and/or publishes them.
pub struct WikiUploader {
	indexer: WikiIndexer,
	paths: WikiPaths,
	locale: String,
	publish: PublishConfig,
	pre_renderer: Option<Box<dyn PreRenderer>>,
	client: Option<Box<dyn WikiClient>>,
}

impl std::fmt::Debug for WikiUploader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WikiUploader")
			.field("indexer", &self.indexer)
			.field("paths", &self.paths)
			.field("locale", &self.locale)
			.field("has_pre_renderer", &self.pre_renderer.is_some())
			.field("has_client", &self.client.is_some())
			.finish_non_exhaustive()
	}
}

impl WikiUploader {
	/// Build the index for `config.locale` and prepare to upload it.
	pub fn new(
		paths: WikiPaths,
		config: &WikiConfig,
		pre_renderer: Option<Box<dyn PreRenderer>>,
	) -> WikiResult<Self> {
		let mut indexer = WikiIndexer::new(&paths, config);
		indexer.build_index()?;

		Ok(Self {
			indexer,
			paths,
			locale: config.locale.clone(),
			publish: config.wiki.clone(),
			pre_renderer,
			client: None,
		})
	}

	/// Publish through `client` when uploading.
	#[must_use]
	pub fn with_client(mut self, client: Box<dyn WikiClient>) -> Self {
		self.client = Some(client);
		self
	}

	pub fn indexer(&self) -> &WikiIndexer {
		&self.indexer
	}

	/// Render every node accepted by `filter` (none when `None`), writing the
	/// output under the tmp directory when `is_save` and publishing it when
	/// `is_upload`. The first failure aborts the batch.
	pub fn upload(
		&mut self,
		is_save: bool,
		is_upload: bool,
		filter: Option<NodeFilter<'_>>,
	) -> WikiResult<UploadReport> {
		let filter = filter.unwrap_or(&reject_all);
		let documents = self.indexer.get_all_documents()?;
		let mut report = UploadReport {
			total: documents.len(),
			..UploadReport::default()
		};

		for id in documents {
			let tree = self.indexer.tree_mut()?;
			let node = tree.get_mut(id);
			if !filter(node) {
				continue;
			}

			let content = node.render(self.pre_renderer.as_deref())?;
			report.processed += 1;

			let tree = self.indexer.tree()?;
			if is_save {
				let target_file = target_file_path(&self.paths, tree.get(id))?;
				if let Some(parent) = target_file.parent() {
					std::fs::create_dir_all(parent)?;
				}
				std::fs::write(&target_file, &content)?;
				tracing::info!(path = %target_file.display(), "saved rendered file");

				report.saved += 1;
				report.saved_files.push(target_file);
			}

			if is_upload {
				let Some(client) = self.client.as_deref() else {
					return Err(WikiError::remote("upload", "no wiki client configured"));
				};
				self.publish(client, tree, id, &content)?;
				report.uploaded += 1;
				tracing::info!(node = %tree.get(id).name, "uploaded page");
			}
		}

		tracing::info!(
			total = report.total,
			processed = report.processed,
			uploaded = report.uploaded,
			saved = report.saved,
			"upload finished"
		);

		Ok(report)
	}

	/// Create-or-update the page for `id`. Pages are keyed by their wiki path,
	/// so re-running after a failure does not duplicate pages.
	fn publish(
		&self,
		client: &dyn WikiClient,
		tree: &WikiTree,
		id: NodeId,
		content: &str,
	) -> WikiResult<()> {
		let node = tree.get(id);
		let meta = PageMeta::for_node(tree, id, &self.publish);
		let template = node
			.template()
			.ok_or_else(|| WikiError::MissingTemplate(node.name.clone()))?;

		let page_id = match client.lookup_page(&self.locale, &meta.path)? {
			Some(page) => page.id,
			None => self.create_page(client, &meta)?,
		};

		let update = match template.output_kind() {
			OutputKind::Html => {
				let parts = extract_html_parts(content, self.publish.main_div_id.as_deref())?;
				PageUpdate {
					id: page_id,
					content: parts.html,
					script_css: Some(parts.style),
					script_js: Some(parts.script),
					editor: Some(self.publish.html_editor.clone()),
					tags: Some(meta.tags.clone()),
				}
			}
			OutputKind::Markdown => {
				PageUpdate {
					id: page_id,
					content: content.to_string(),
					script_css: None,
					script_js: None,
					editor: Some(self.publish.editor.clone()),
					tags: Some(meta.tags.clone()),
				}
			}
		};

		let result = client.update_page(&update)?;
		if !result.succeeded {
			return Err(WikiError::remote(
				format!("update of `{}`", meta.path),
				result.failure_message(),
			));
		}

		Ok(())
	}

	/// Create a placeholder page and poll until the wiki reports its id.
	fn create_page(&self, client: &dyn WikiClient, meta: &PageMeta) -> WikiResult<i64> {
		tracing::info!(path = %meta.path, "creating page");
		let created = client.create_page(&NewPage {
			title: meta.title.clone(),
			locale: self.locale.clone(),
			path: meta.path.clone(),
			content: self.publish.placeholder.clone(),
			editor: self.publish.editor.clone(),
			tags: meta.tags.clone(),
		})?;
		if !created.result.succeeded {
			return Err(WikiError::remote(
				format!("create of `{}`", meta.path),
				created.result.failure_message(),
			));
		}

		let attempts = self.publish.lookup_attempts.max(1);
		for attempt in 1..=attempts {
			if let Some(page) = client.lookup_page(&self.locale, &meta.path)? {
				return Ok(page.id);
			}
			tracing::debug!(path = %meta.path, attempt, "created page not visible yet");
			if attempt < attempts && self.publish.lookup_delay_ms > 0 {
				std::thread::sleep(Duration::from_millis(self.publish.lookup_delay_ms));
			}
		}

		Err(WikiError::remote(
			format!("create of `{}`", meta.path),
			format!("page not found after {attempts} lookups"),
		))
	}
}

/// Output location for `node`: its data file's path relative to the data
/// directory, re-rooted under the tmp directory, with the template's
/// extension.
pub fn target_file_path(paths: &WikiPaths, node: &WikiNode) -> WikiResult<PathBuf> {
	let data_path = node.data_path().ok_or_else(|| WikiError::Structural {
		node: node.name.clone(),
		reason: "node has no data file to derive an output path from".to_string(),
	})?;
	let data_path = std::path::absolute(data_path)?;
	let data_dir = std::path::absolute(&paths.data_dir)?;
	let relative = data_path
		.strip_prefix(&data_dir)
		.map_err(|_| WikiError::OutsideDataDir {
			path: data_path.clone(),
			data_dir: data_dir.clone(),
		})?;

	let target = paths.tmp_dir.join(relative);
	Ok(match node.template().and_then(|template| template.extension()) {
		Some(extension) => target.with_extension(extension),
		None => target,
	})
}
