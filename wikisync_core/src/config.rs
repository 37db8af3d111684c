use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::WikiError;
use crate::WikiResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"wikisync.toml",
	".wikisync.toml",
	".config/wikisync.toml",
];

/// Name of the index file enumerating a directory's children.
pub const DEFAULT_INDEX_FILE: &str = "contents.json";

/// Default base path for icon images referenced by `${name}` placeholders.
pub const DEFAULT_IMAGE_BASE_PATH: &str = "/assets/icon";

/// Number of lookups attempted after creating a page before giving up.
pub const DEFAULT_LOOKUP_ATTEMPTS: u32 = 4;

/// Filesystem layout for a wikisync project.
///
/// Built once at process start and passed explicitly to the indexer, the
/// uploader and the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPaths {
	/// Project root directory.
	pub root: PathBuf,
	/// Directory holding one sub-directory per locale.
	pub data_dir: PathBuf,
	/// Directory rendered output is written to.
	pub tmp_dir: PathBuf,
	/// `.env` file holding wiki credentials.
	pub env_file: PathBuf,
}

impl WikiPaths {
	/// Default layout rooted at `root`: `data/`, `tmp/` and `.env`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		let root = root.into();
		Self {
			data_dir: root.join("data"),
			tmp_dir: root.join("tmp"),
			env_file: root.join(".env"),
			root,
		}
	}

	/// Layout for `root` with the directory overrides from `config` applied.
	pub fn from_config(root: impl Into<PathBuf>, config: &WikiConfig) -> Self {
		let mut paths = Self::new(root);
		if let Some(data_dir) = &config.data_dir {
			paths.data_dir = paths.root.join(data_dir);
		}
		if let Some(tmp_dir) = &config.tmp_dir {
			paths.tmp_dir = paths.root.join(tmp_dir);
		}
		paths
	}

	/// Directory holding the content tree for `locale`.
	pub fn locale_dir(&self, locale: &str) -> PathBuf {
		self.data_dir.join(locale)
	}
}

/// Configuration loaded from a `wikisync.toml` file.
///
/// ```toml
/// locale = "zh"
/// index_file = "contents.json"
/// templates_dir = "templates"
///
/// [render]
/// image_base_path = "/assets/icon"
///
/// [wiki]
/// url = "https://wiki.example.com"
/// editor = "markdown"
/// tags = ["cards"]
///
/// [sync]
/// register_file = "deck_json_register.json"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
	/// Locale sub-directory of the data directory to index.
	pub locale: String,
	/// File name of the root index inside the locale directory.
	pub index_file: String,
	/// Directory, relative to the locale directory, that template
	/// declarations are resolved against.
	pub templates_dir: PathBuf,
	/// Overrides `<root>/data`.
	pub data_dir: Option<PathBuf>,
	/// Overrides `<root>/tmp`.
	pub tmp_dir: Option<PathBuf>,
	pub render: RenderConfig,
	pub wiki: PublishConfig,
	pub sync: SyncConfig,
}

impl Default for WikiConfig {
	fn default() -> Self {
		Self {
			locale: "zh".to_string(),
			index_file: DEFAULT_INDEX_FILE.to_string(),
			templates_dir: PathBuf::from("templates"),
			data_dir: None,
			tmp_dir: None,
			render: RenderConfig::default(),
			wiki: PublishConfig::default(),
			sync: SyncConfig::default(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
	/// Base path embedded in the image references produced for `${name}`
	/// placeholders.
	pub image_base_path: String,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			image_base_path: DEFAULT_IMAGE_BASE_PATH.to_string(),
		}
	}
}

/// Settings for publishing to the remote wiki.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
	/// Base url of the wiki. `WIKI_URL` takes precedence when set.
	pub url: Option<String>,
	/// Editor type recorded for markdown pages.
	pub editor: String,
	/// Editor type recorded for pages rendered from full html documents.
	pub html_editor: String,
	/// Tags applied to pages whose data does not declare its own.
	pub tags: Vec<String>,
	/// Content a page is created with before its first update.
	pub placeholder: String,
	/// Lookups attempted after a create before the page id is considered
	/// unavailable.
	pub lookup_attempts: u32,
	/// Pause between those lookups, in milliseconds.
	pub lookup_delay_ms: u64,
	/// `id` of the div holding the page body in html output. The first div is
	/// used when unset.
	pub main_div_id: Option<String>,
}

impl Default for PublishConfig {
	fn default() -> Self {
		Self {
			url: None,
			editor: "markdown".to_string(),
			html_editor: "code".to_string(),
			tags: Vec::new(),
			placeholder: "placeholder".to_string(),
			lookup_attempts: DEFAULT_LOOKUP_ATTEMPTS,
			lookup_delay_ms: 500,
			main_div_id: None,
		}
	}
}

/// Settings for the design-data synchronizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
	/// Register file mapping card json files to target data files, relative
	/// to the project root.
	pub register_file: PathBuf,
	/// Directory of card json files, relative to the locale directory.
	pub card_json_dir: PathBuf,
	/// Directory the per-card data files are written to, relative to the
	/// locale directory.
	pub target_dir: PathBuf,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			register_file: PathBuf::from("deck_json_register.json"),
			card_json_dir: PathBuf::from("card_json"),
			target_dir: PathBuf::from("card"),
		}
	}
}

impl WikiConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> WikiResult<Option<WikiConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: WikiConfig =
			toml::from_str(&content).map_err(|e| WikiError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to defaults.
	pub fn load_or_default(root: &Path) -> WikiResult<WikiConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}
}
