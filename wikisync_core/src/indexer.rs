use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::Map;
use serde_json::Value;

use crate::FileKind;
use crate::NodeId;
use crate::Template;
use crate::WikiConfig;
use crate::WikiError;
use crate::WikiNode;
use crate::WikiPaths;
use crate::WikiResult;
use crate::WikiTree;
use crate::config::DEFAULT_IMAGE_BASE_PATH;
use crate::config::DEFAULT_INDEX_FILE;

/// Name given to the root directory node.
pub const ROOT_NODE_NAME: &str = "root";

/// The shape of a child entry in an index file's `children` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChildDescriptor {
	Directory {
		index: PathBuf,
		data: Option<PathBuf>,
		template: Option<PathBuf>,
	},
	Document {
		data: PathBuf,
		template: Option<PathBuf>,
	},
}

impl ChildDescriptor {
	/// Classify a child entry: an `index` key makes a directory, otherwise a
	/// `data` key makes a document.
	fn parse(name: &str, value: &Value) -> WikiResult<Self> {
		let Value::Object(entry) = value else {
			return Err(WikiError::Structural {
				node: name.to_string(),
				reason: "child entry is not a mapping".to_string(),
			});
		};

		let template = declared_path(entry, "template", name)?;
		if let Some(index) = declared_path(entry, "index", name)? {
			let data = declared_path(entry, "data", name)?;
			return Ok(Self::Directory {
				index,
				data,
				template,
			});
		}
		if let Some(data) = declared_path(entry, "data", name)? {
			return Ok(Self::Document { data, template });
		}

		Err(WikiError::Structural {
			node: name.to_string(),
			reason: "entry has neither an `index` nor a `data` key".to_string(),
		})
	}
}

/// Builds the content tree for one locale from its root index file.
///
/// ```text
/// contents.json
///   { "template": "base.md",
///     "children": {
///       "rules": { "data": "rules.md" },
///       "card":  { "index": "contents.json", "template": "card.html" } } }
/// card/contents.json
///   { "children": { "aP01": { "data": "aP01.json" } } }
/// ```
///
/// Parsing is pre-order: a node's template is resolved before any of its
/// children are constructed, so children can inherit it.
#[derive(Debug)]
pub struct WikiIndexer {
	locale: String,
	root_path: PathBuf,
	templates_path: PathBuf,
	root_index_file: PathBuf,
	image_base_path: String,
	tree: Option<WikiTree>,
}

impl WikiIndexer {
	/// Indexer for the locale configured in `config`, laid out per `paths`.
	pub fn new(paths: &WikiPaths, config: &WikiConfig) -> Self {
		let root_path = paths.locale_dir(&config.locale);
		Self {
			locale: config.locale.clone(),
			templates_path: root_path.join(&config.templates_dir),
			root_index_file: root_path.join(&config.index_file),
			root_path,
			image_base_path: config.render.image_base_path.clone(),
			tree: None,
		}
	}

	/// Indexer for the tree rooted at `root_path`, with templates under
	/// `root_path/templates` and the default index file name.
	pub fn from_root(root_path: impl Into<PathBuf>) -> Self {
		let root_path = root_path.into();
		Self {
			locale: String::new(),
			templates_path: root_path.join("templates"),
			root_index_file: root_path.join(DEFAULT_INDEX_FILE),
			root_path,
			image_base_path: DEFAULT_IMAGE_BASE_PATH.to_string(),
			tree: None,
		}
	}

	pub fn locale(&self) -> &str {
		&self.locale
	}

	pub fn root_path(&self) -> &Path {
		&self.root_path
	}

	pub fn templates_path(&self) -> &Path {
		&self.templates_path
	}

	pub fn root_index_file(&self) -> &Path {
		&self.root_index_file
	}

	/// Build the whole tree. Any missing file or malformed entry aborts the
	/// build and leaves the indexer without a tree.
	pub fn build_index(&mut self) -> WikiResult<&mut Self> {
		self.tree = None;

		let root_index_file = std::path::absolute(&self.root_index_file)?;
		let root_path = std::path::absolute(&self.root_path)?;
		let root_index = read_index(&root_index_file, ROOT_NODE_NAME)?;
		let root = WikiNode::directory(
			ROOT_NODE_NAME,
			root_path,
			root_index_file,
			declared_path(&root_index, "data", ROOT_NODE_NAME)?,
		)?;

		let mut tree = WikiTree::new(root);
		let root_id = tree.root();
		self.parse_directory(&mut tree, root_id, &root_index)?;

		tracing::info!(
			locale = %self.locale,
			nodes = tree.len(),
			"built wiki index"
		);
		self.tree = Some(tree);

		Ok(self)
	}

	fn parse_directory(
		&self,
		tree: &mut WikiTree,
		dir_id: NodeId,
		index: &Map<String, Value>,
	) -> WikiResult<()> {
		let dir_name = tree.get(dir_id).name.clone();
		tracing::debug!(node = %dir_name, "parsing directory");

		let declared = declared_path(index, "template", &dir_name)?;
		self.resolve_template(tree, dir_id, declared.as_deref())?;

		let Some(Value::Object(children)) = index.get("children") else {
			return Err(WikiError::Structural {
				node: dir_name,
				reason: "index file has no `children` mapping".to_string(),
			});
		};

		for (child_name, child_value) in children {
			let descriptor = ChildDescriptor::parse(child_name, child_value)?;
			let parent_path = tree.get(dir_id).path.clone();

			match descriptor {
				ChildDescriptor::Directory {
					index,
					data,
					template,
				} => {
					let subdir_path = parent_path.join(child_name);
					let index_file = subdir_path.join(index);
					let data_file = data.map(|data| parent_path.join(data));
					let child = WikiNode::directory(
						child_name.as_str(),
						subdir_path,
						index_file.as_path(),
						data_file,
					)?;
					let child_id = tree.add_child(dir_id, child)?;
					self.resolve_template(tree, child_id, template.as_deref())?;

					let child_index = read_index(&index_file, child_name)?;
					self.parse_directory(tree, child_id, &child_index)?;
				}
				ChildDescriptor::Document { data, template } => {
					let child = WikiNode::document(child_name.as_str(), parent_path, data)?;
					let child_id = tree.add_child(dir_id, child)?;
					self.resolve_template(tree, child_id, template.as_deref())?;
				}
			}
		}

		Ok(())
	}

	/// An explicit declaration always wins, then a template the node already
	/// carries, then the parent's template instance.
	fn resolve_template(
		&self,
		tree: &mut WikiTree,
		id: NodeId,
		declared: Option<&Path>,
	) -> WikiResult<()> {
		if let Some(declared) = declared {
			let template_path = self.templates_path.join(declared);
			tracing::debug!(
				node = %tree.get(id).name,
				template = %template_path.display(),
				"loading declared template"
			);
			let template = Template::with_image_base_path(template_path, &self.image_base_path)?;
			tree.get_mut(id).set_template(Rc::new(template));
			return Ok(());
		}

		let node = tree.get(id);
		if let Some(template) = node.template() {
			tracing::debug!(
				node = %node.name,
				template = %template.template_path().display(),
				"keeping existing template"
			);
			return Ok(());
		}

		let inherited = node
			.parent()
			.and_then(|parent| tree.get(parent).template().cloned());
		let Some(template) = inherited else {
			return Err(WikiError::TemplateResolution(node.name.clone()));
		};

		tracing::debug!(
			node = %node.name,
			template = %template.template_path().display(),
			"inheriting parent template"
		);
		tree.get_mut(id).set_template(template);

		Ok(())
	}

	pub fn tree(&self) -> WikiResult<&WikiTree> {
		self.tree.as_ref().ok_or(WikiError::IndexNotBuilt)
	}

	pub fn tree_mut(&mut self) -> WikiResult<&mut WikiTree> {
		self.tree.as_mut().ok_or(WikiError::IndexNotBuilt)
	}

	/// Every document plus every directory with a data file, in pre-order
	/// with children in declaration order.
	pub fn get_all_documents(&self) -> WikiResult<Vec<NodeId>> {
		let tree = self.tree()?;
		Ok(tree
			.pre_order()
			.into_iter()
			.filter(|id| tree.get(*id).is_renderable())
			.collect())
	}
}

fn read_index(path: &Path, node: &str) -> WikiResult<Map<String, Value>> {
	if !path.is_file() {
		return Err(WikiError::not_found(FileKind::Index, path));
	}

	let content = std::fs::read_to_string(path)?;
	let value: Value = serde_json::from_str(&content).map_err(|e| WikiError::DataFile {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;

	match value {
		Value::Object(map) => Ok(map),
		_ => Err(WikiError::Structural {
			node: node.to_string(),
			reason: format!("index file `{}` is not a mapping", path.display()),
		}),
	}
}

/// Read an optional path-valued key. `null` counts as absent.
fn declared_path(entry: &Map<String, Value>, key: &str, node: &str) -> WikiResult<Option<PathBuf>> {
	match entry.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(path)) => Ok(Some(PathBuf::from(path))),
		Some(_) => Err(WikiError::Structural {
			node: node.to_string(),
			reason: format!("`{key}` must be a relative path string"),
		}),
	}
}
