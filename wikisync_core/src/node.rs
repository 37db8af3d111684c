use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::Map;
use serde_json::Value;

use crate::FileKind;
use crate::PreRenderer;
use crate::Template;
use crate::WikiError;
use crate::WikiResult;

/// Key markdown data files are stored under when loaded.
pub const MARKDOWN_DATA_KEY: &str = "text";

/// Index of a node inside a [`WikiTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	pub fn index(self) -> usize {
		self.0
	}
}

/// Variant-specific part of a [`WikiNode`].
#[derive(Debug)]
pub enum NodeKind {
	Directory {
		/// The JSON file enumerating this directory's children.
		index_file: PathBuf,
		/// Children in the order they were declared in the index file.
		children: Vec<NodeId>,
	},
	Document,
}

/// A directory or document in the wiki content tree.
#[derive(Debug)]
pub struct WikiNode {
	/// Identifier unique among siblings.
	pub name: String,
	/// The node's containing directory.
	pub path: PathBuf,
	/// Data loaded from `data_file`, set at most once.
	pub data: Option<Map<String, Value>>,
	/// Data file, relative to `path`.
	pub data_file: Option<PathBuf>,
	template: Option<Rc<Template>>,
	template_path: Option<PathBuf>,
	parent: Option<NodeId>,
	kind: NodeKind,
}

impl WikiNode {
	/// Create a directory node. `index_file` must exist, as must
	/// `path / data_file` when a data file is declared.
	pub fn directory(
		name: impl Into<String>,
		path: impl Into<PathBuf>,
		index_file: impl Into<PathBuf>,
		data_file: Option<PathBuf>,
	) -> WikiResult<Self> {
		let path = path.into();
		let index_file = index_file.into();
		if !index_file.is_file() {
			return Err(WikiError::not_found(FileKind::Index, index_file));
		}
		if let Some(data_file) = &data_file {
			ensure_data_file(&path.join(data_file))?;
		}

		Ok(Self::with_kind(
			name.into(),
			path,
			data_file,
			NodeKind::Directory {
				index_file,
				children: Vec::new(),
			},
		))
	}

	/// Create a document node. `path / data_file` must exist.
	pub fn document(
		name: impl Into<String>,
		path: impl Into<PathBuf>,
		data_file: impl Into<PathBuf>,
	) -> WikiResult<Self> {
		let path = path.into();
		let data_file = data_file.into();
		ensure_data_file(&path.join(&data_file))?;

		Ok(Self::with_kind(
			name.into(),
			path,
			Some(data_file),
			NodeKind::Document,
		))
	}

	fn with_kind(name: String, path: PathBuf, data_file: Option<PathBuf>, kind: NodeKind) -> Self {
		Self {
			name,
			path,
			data: None,
			data_file,
			template: None,
			template_path: None,
			parent: None,
			kind,
		}
	}

	pub fn is_directory(&self) -> bool {
		matches!(self.kind, NodeKind::Directory { .. })
	}

	pub fn is_document(&self) -> bool {
		matches!(self.kind, NodeKind::Document)
	}

	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	/// Children of a directory, empty for documents.
	pub fn children(&self) -> &[NodeId] {
		match &self.kind {
			NodeKind::Directory { children, .. } => children,
			NodeKind::Document => &[],
		}
	}

	pub fn index_file(&self) -> Option<&Path> {
		match &self.kind {
			NodeKind::Directory { index_file, .. } => Some(index_file),
			NodeKind::Document => None,
		}
	}

	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	pub fn template(&self) -> Option<&Rc<Template>> {
		self.template.as_ref()
	}

	pub fn template_path(&self) -> Option<&Path> {
		self.template_path.as_deref()
	}

	/// Whether this node produces a page: every document, and directories
	/// carrying their own data file.
	pub fn is_renderable(&self) -> bool {
		self.is_document() || self.data_file.is_some()
	}

	/// Absolute path of the data file, if any.
	pub fn data_path(&self) -> Option<PathBuf> {
		self.data_file.as_ref().map(|file| self.path.join(file))
	}

	/// Share `template` with this node, keeping `template_path` in sync.
	pub fn set_template(&mut self, template: Rc<Template>) {
		self.template_path = Some(template.template_path().to_path_buf());
		self.template = Some(template);
	}

	/// Load `data_file` into `data`. A node without a data file is left
	/// untouched.
	pub fn load_data(&mut self) -> WikiResult<()> {
		let Some(full_path) = self.data_path() else {
			return Ok(());
		};
		ensure_data_file(&full_path)?;

		tracing::debug!(node = %self.name, path = %full_path.display(), "loading data file");

		let content = std::fs::read_to_string(&full_path)?;
		let format = full_path
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();
		self.data = Some(parse_data_file(&content, &format, &full_path)?);

		Ok(())
	}

	/// Render this node through its template, loading data on first use and
	/// passing it through `pre_renderer` when one is given.
	pub fn render(&mut self, pre_renderer: Option<&dyn PreRenderer>) -> WikiResult<String> {
		if self.data.is_none() && self.data_file.is_some() {
			self.load_data()?;
		}

		let Some(template) = &self.template else {
			return Err(WikiError::MissingTemplate(self.name.clone()));
		};

		match (pre_renderer, &self.data) {
			(Some(pre_renderer), Some(data)) => {
				let rendered = pre_renderer.render(&Value::Object(data.clone()))?;
				template.render(&rendered)
			}
			(None, Some(data)) => template.render(data),
			(_, None) => template.render(&Map::new()),
		}
	}
}

fn ensure_data_file(path: &Path) -> WikiResult<()> {
	if path.is_file() {
		Ok(())
	} else {
		Err(WikiError::not_found(FileKind::Data, path))
	}
}

fn parse_data_file(content: &str, format: &str, path: &Path) -> WikiResult<Map<String, Value>> {
	match format {
		"json" => {
			let value: Value = serde_json::from_str(content).map_err(|e| WikiError::DataFile {
				path: path.display().to_string(),
				reason: e.to_string(),
			})?;
			match value {
				Value::Object(map) => Ok(map),
				_ => Err(WikiError::DataFile {
					path: path.display().to_string(),
					reason: "expected a JSON object at the top level".to_string(),
				}),
			}
		}
		"md" | "markdown" => {
			let mut map = Map::new();
			map.insert(
				MARKDOWN_DATA_KEY.to_string(),
				Value::String(content.to_string()),
			);
			Ok(map)
		}
		other => Err(WikiError::UnsupportedDataFormat(other.to_string())),
	}
}

/// Arena holding every node of a content tree. Index 0 is the root.
#[derive(Debug)]
pub struct WikiTree {
	nodes: Vec<WikiNode>,
}

impl WikiTree {
	/// Create a tree whose root is `root`.
	pub fn new(root: WikiNode) -> Self {
		Self { nodes: vec![root] }
	}

	pub fn root(&self) -> NodeId {
		NodeId(0)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn get(&self, id: NodeId) -> &WikiNode {
		&self.nodes[id.0]
	}

	pub fn get_mut(&mut self, id: NodeId) -> &mut WikiNode {
		&mut self.nodes[id.0]
	}

	/// Append `node` to the children of directory `parent` and return its id.
	/// Names are not de-duplicated.
	pub fn add_child(&mut self, parent: NodeId, mut node: WikiNode) -> WikiResult<NodeId> {
		let id = NodeId(self.nodes.len());
		let parent_node = &mut self.nodes[parent.0];
		let NodeKind::Directory { children, .. } = &mut parent_node.kind else {
			return Err(WikiError::Structural {
				node: node.name,
				reason: format!("parent `{}` is a document", parent_node.name),
			});
		};
		children.push(id);
		node.parent = Some(parent);
		self.nodes.push(node);

		Ok(id)
	}

	/// Ancestors of `id`, nearest first, ending at the root.
	pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		std::iter::successors(self.get(id).parent, |current| self.get(*current).parent)
	}

	/// Names from below the root down to `id`.
	pub fn node_path(&self, id: NodeId) -> Vec<&str> {
		let mut names: Vec<&str> = std::iter::once(id)
			.chain(self.ancestors(id))
			.filter(|current| *current != self.root())
			.map(|current| self.get(current).name.as_str())
			.collect();
		names.reverse();
		names
	}

	/// Every node id in pre-order, children in declaration order.
	pub fn pre_order(&self) -> Vec<NodeId> {
		let mut order = Vec::with_capacity(self.nodes.len());
		if self.nodes.is_empty() {
			return order;
		}

		let mut stack = vec![self.root()];
		while let Some(id) = stack.pop() {
			order.push(id);
			stack.extend(self.get(id).children().iter().rev().copied());
		}
		order
	}
}
