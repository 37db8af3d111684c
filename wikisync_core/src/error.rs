use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// The kind of file that could not be found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FileKind {
	Index,
	Data,
	Template,
	Register,
}

impl std::fmt::Display for FileKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let label = match self {
			Self::Index => "index file",
			Self::Data => "data file",
			Self::Template => "template file",
			Self::Register => "register file",
		};
		f.write_str(label)
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum WikiError {
	#[error(transparent)]
	#[diagnostic(code(wikisync::io_error))]
	Io(#[from] std::io::Error),

	#[error("{kind} not found: `{}`", .path.display())]
	#[diagnostic(
		code(wikisync::not_found),
		help("check the path declared in the parent index file")
	)]
	NotFound { kind: FileKind, path: PathBuf },

	#[error("malformed index entry `{node}`: {reason}")]
	#[diagnostic(
		code(wikisync::structural),
		help(
			"a child entry needs an `index` key (directory) or a `data` key (document), and every \
			 index file needs a `children` mapping"
		)
	)]
	Structural { node: String, reason: String },

	#[error("no template found for node `{0}`")]
	#[diagnostic(
		code(wikisync::template_resolution),
		help("declare a `template` on this node or on one of its ancestors")
	)]
	TemplateResolution(String),

	#[error("node `{0}` has no template to render with")]
	#[diagnostic(code(wikisync::missing_template))]
	MissingTemplate(String),

	#[error("`{path}` has {data_count} entries, but the register lists {register_count}")]
	#[diagnostic(
		code(wikisync::count_mismatch),
		help("update the register file so every card has a target entry")
	)]
	CountMismatch {
		path: String,
		data_count: usize,
		register_count: usize,
	},

	#[error("remote wiki {operation} failed: {message}")]
	#[diagnostic(
		code(wikisync::remote_failure),
		help("re-run the upload, pages are looked up by path so it is safe to retry")
	)]
	Remote { operation: String, message: String },

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(wikisync::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(wikisync::unsupported_format),
		help("supported formats: json, md")
	)]
	UnsupportedDataFormat(String),

	#[error("pre-render input must be a mapping, got {0}")]
	#[diagnostic(code(wikisync::not_a_mapping))]
	NotAMapping(String),

	#[error("template `{path}` failed: {message}")]
	#[diagnostic(code(wikisync::template))]
	Template { path: String, message: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(wikisync::config_parse),
		help("check that wikisync.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("the wiki index has not been built")]
	#[diagnostic(
		code(wikisync::index_not_built),
		help("call `build_index()` before querying documents")
	)]
	IndexNotBuilt,

	#[error("failed to extract html parts: {0}")]
	#[diagnostic(code(wikisync::html_extract))]
	HtmlExtract(String),

	#[error("`{}` is outside the data directory `{}`", .path.display(), .data_dir.display())]
	#[diagnostic(code(wikisync::outside_data_dir))]
	OutsideDataDir { path: PathBuf, data_dir: PathBuf },
}

impl WikiError {
	pub(crate) fn not_found(kind: FileKind, path: impl Into<PathBuf>) -> Self {
		Self::NotFound {
			kind,
			path: path.into(),
		}
	}

	pub(crate) fn template(path: &std::path::Path, error: &minijinja::Error) -> Self {
		Self::Template {
			path: path.display().to_string(),
			message: format!("{error:#}"),
		}
	}

	/// Build a remote failure for the given operation.
	pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Remote {
			operation: operation.into(),
			message: message.into(),
		}
	}
}

pub type WikiResult<T> = Result<T, WikiError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
