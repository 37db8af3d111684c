use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::FileKind;
use crate::WikiConfig;
use crate::WikiError;
use crate::WikiPaths;
use crate::WikiResult;

/// Where one card of a design-data file is written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterEntry {
	/// Sub-directory of the target directory.
	pub dir: PathBuf,
	/// File name inside `dir`.
	pub file: PathBuf,
}

/// Splits design-data card files into per-card data files and regenerates
/// the index files of the directories they land in.
///
/// The register maps each card json file to one entry per card, in order:
///
/// ```json
/// { "deck_a.json": [ { "dir": "aP", "file": "aP01.json" } ] }
/// ```
#[derive(Debug)]
pub struct WikiSynchronizer {
	register_file: PathBuf,
	register: Vec<(String, Vec<RegisterEntry>)>,
	locale_dir: PathBuf,
	card_json_dir: PathBuf,
	target_dir: PathBuf,
	index_file: String,
}

impl WikiSynchronizer {
	/// Load the register configured in `config.sync`.
	pub fn new(paths: &WikiPaths, config: &WikiConfig) -> WikiResult<Self> {
		let locale_dir = paths.locale_dir(&config.locale);
		let register_file = paths.root.join(&config.sync.register_file);
		let register = load_register(&register_file)?;

		Ok(Self {
			register_file,
			register,
			card_json_dir: locale_dir.join(&config.sync.card_json_dir),
			target_dir: locale_dir.join(&config.sync.target_dir),
			locale_dir,
			index_file: config.index_file.clone(),
		})
	}

	pub fn register_file(&self) -> &Path {
		&self.register_file
	}

	pub fn locale_dir(&self) -> &Path {
		&self.locale_dir
	}

	pub fn target_dir(&self) -> &Path {
		&self.target_dir
	}

	/// Write every registered card to its data file, then rebuild the index
	/// files. Returns the number of card files written.
	pub fn sync(&self) -> WikiResult<usize> {
		let mut written = 0;
		for (card_json_file, entries) in &self.register {
			let card_json_path = self.card_json_dir.join(card_json_file);
			let cards = load_cards(&card_json_path)?;
			if cards.len() != entries.len() {
				return Err(WikiError::CountMismatch {
					path: card_json_path.display().to_string(),
					data_count: cards.len(),
					register_count: entries.len(),
				});
			}

			for (card, entry) in cards.iter().zip(entries) {
				let target_path = self.target_dir.join(&entry.dir).join(&entry.file);
				if let Some(parent) = target_path.parent() {
					std::fs::create_dir_all(parent)?;
				}
				write_json(&target_path, card)?;
				written += 1;
			}

			tracing::info!(
				file = %card_json_path.display(),
				cards = cards.len(),
				"synchronized card file"
			);
		}

		self.sync_content()?;
		Ok(written)
	}

	/// Regenerate the index file of every sub-directory of the target
	/// directory from the json data files it contains.
	pub fn sync_content(&self) -> WikiResult<()> {
		if !self.target_dir.is_dir() {
			return Err(WikiError::not_found(FileKind::Data, &self.target_dir));
		}

		let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.target_dir)?
			.map(|entry| entry.map(|entry| entry.path()))
			.collect::<Result<_, _>>()?;
		dirs.retain(|path| path.is_dir());
		dirs.sort();

		for dir in dirs {
			let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
				.map(|entry| entry.map(|entry| entry.path()))
				.collect::<Result<_, _>>()?;
			files.retain(|path| {
				path.is_file()
					&& path.extension().is_some_and(|ext| ext == "json")
					&& path.file_name().is_some_and(|name| name != self.index_file.as_str())
			});
			files.sort();

			let mut children = Map::new();
			for file in &files {
				let (Some(stem), Some(name)) = (file.file_stem(), file.file_name()) else {
					continue;
				};
				let mut descriptor = Map::new();
				descriptor.insert(
					"data".to_string(),
					Value::String(name.to_string_lossy().into_owned()),
				);
				children.insert(stem.to_string_lossy().into_owned(), Value::Object(descriptor));
			}

			let mut index = Map::new();
			index.insert("children".to_string(), Value::Object(children));
			write_json(&dir.join(&self.index_file), &Value::Object(index))?;

			tracing::debug!(dir = %dir.display(), files = files.len(), "regenerated index file");
		}

		Ok(())
	}
}

fn load_register(path: &Path) -> WikiResult<Vec<(String, Vec<RegisterEntry>)>> {
	if !path.is_file() {
		return Err(WikiError::not_found(FileKind::Register, path));
	}

	let content = std::fs::read_to_string(path)?;
	let register: Map<String, Value> =
		serde_json::from_str(&content).map_err(|e| WikiError::DataFile {
			path: path.display().to_string(),
			reason: e.to_string(),
		})?;

	register
		.into_iter()
		.map(|(file, entries)| {
			let entries: Vec<RegisterEntry> =
				serde_json::from_value(entries).map_err(|e| WikiError::DataFile {
					path: path.display().to_string(),
					reason: format!("entries for `{file}`: {e}"),
				})?;
			Ok((file, entries))
		})
		.collect()
}

fn load_cards(path: &Path) -> WikiResult<Vec<Value>> {
	if !path.is_file() {
		return Err(WikiError::not_found(FileKind::Data, path));
	}

	let content = std::fs::read_to_string(path)?;
	serde_json::from_str(&content).map_err(|e| WikiError::DataFile {
		path: path.display().to_string(),
		reason: e.to_string(),
	})
}

fn write_json(path: &Path, value: &Value) -> WikiResult<()> {
	let mut payload = serde_json::to_string_pretty(value).map_err(|e| WikiError::DataFile {
		path: path.display().to_string(),
		reason: e.to_string(),
	})?;
	payload.push('\n');
	std::fs::write(path, payload)?;
	Ok(())
}
