use std::borrow::Cow;
use std::cell::RefCell;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use minijinja::AutoEscape;
use minijinja::Environment;
use minijinja::ErrorKind;
use serde_json::Map;
use serde_json::Value;

use crate::FileKind;
use crate::WikiError;
use crate::WikiResult;
use crate::config::DEFAULT_IMAGE_BASE_PATH;
use crate::pre_render::icon_markup;
use crate::pre_render::line_breaks;

/// The kind of document a template produces, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
	Markdown,
	/// A full html document whose body, script and style are published
	/// separately.
	Html,
}

/// A template file compiled once and rendered any number of times.
///
/// `{% extends %}`, `{% include %}` and `{% import %}` resolve relative to
/// the template that contains them, so `parts/header.md` may include its
/// sibling `footer.md` and `cards/card.html` may extend `../base.html`.
/// Nodes share a `Template` through `Rc`;
/// filters and globals registered after construction are visible to every
/// node referencing it.
pub struct Template {
	template_path: PathBuf,
	name: String,
	env: RefCell<Environment<'static>>,
}

impl std::fmt::Debug for Template {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Template")
			.field("template_path", &self.template_path)
			.finish_non_exhaustive()
	}
}

impl Template {
	/// Load and compile the template at `template_path`.
	pub fn new(template_path: impl Into<PathBuf>) -> WikiResult<Self> {
		Self::with_image_base_path(template_path, DEFAULT_IMAGE_BASE_PATH)
	}

	/// Load and compile the template, using `image_base_path` for the `icon`
	/// global.
	pub fn with_image_base_path(
		template_path: impl Into<PathBuf>,
		image_base_path: &str,
	) -> WikiResult<Self> {
		let template_path = template_path.into();
		if !template_path.is_file() {
			return Err(WikiError::not_found(FileKind::Template, template_path));
		}

		let name = normalize_path(&template_path)
			.to_string_lossy()
			.into_owned();

		let mut env = Environment::new();
		env.set_loader(load_template_source);
		env.set_path_join_callback(join_template_name);
		env.set_keep_trailing_newline(true);
		env.set_trim_blocks(true);
		env.set_lstrip_blocks(true);
		// Data is pre-rendered into html on purpose.
		env.set_auto_escape_callback(|_| AutoEscape::None);
		register_builtins(&mut env, image_base_path);

		// Compile eagerly so syntax errors surface at load time.
		env.get_template(&name)
			.map_err(|e| WikiError::template(&template_path, &e))?;

		tracing::debug!(path = %template_path.display(), "compiled template");

		Ok(Self {
			template_path,
			name,
			env: RefCell::new(env),
		})
	}

	pub fn template_path(&self) -> &Path {
		&self.template_path
	}

	/// The template file's extension, without the leading dot.
	pub fn extension(&self) -> Option<&str> {
		self.template_path.extension().and_then(|ext| ext.to_str())
	}

	pub fn output_kind(&self) -> OutputKind {
		match self.extension().map(str::to_ascii_lowercase).as_deref() {
			Some("html" | "htm") => OutputKind::Html,
			_ => OutputKind::Markdown,
		}
	}

	/// Render with `data` as the template context.
	pub fn render(&self, data: &Map<String, Value>) -> WikiResult<String> {
		let env = self.env.borrow();
		let template = env
			.get_template(&self.name)
			.map_err(|e| WikiError::template(&self.template_path, &e))?;

		template
			.render(minijinja::Value::from_serialize(data))
			.map_err(|e| WikiError::template(&self.template_path, &e))
	}

	/// Register a string filter usable as `{{ value | name }}`.
	pub fn add_filter<F>(&self, name: impl Into<String>, filter: F)
	where
		F: Fn(String) -> String + Send + Sync + 'static,
	{
		self.env
			.borrow_mut()
			.add_filter(name.into(), move |value: String| filter(value));
	}

	/// Register a global value visible to every render.
	pub fn add_global(&self, name: impl Into<String>, value: impl Into<minijinja::Value>) {
		self.env.borrow_mut().add_global(name.into(), value.into());
	}

	/// Direct access to the underlying environment for registrations the
	/// helpers above do not cover.
	pub fn with_environment<R>(&self, f: impl FnOnce(&mut Environment<'static>) -> R) -> R {
		f(&mut self.env.borrow_mut())
	}
}

/// Template names are file paths. Missing files report as unknown templates.
fn load_template_source(name: &str) -> Result<Option<String>, minijinja::Error> {
	match std::fs::read_to_string(name) {
		Ok(source) => Ok(Some(source)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => {
			Err(
				minijinja::Error::new(ErrorKind::InvalidOperation, "could not read template")
					.with_source(e),
			)
		}
	}
}

/// Resolve `name` against the directory of the template referencing it.
fn join_template_name<'s>(name: &'s str, parent: &'s str) -> Cow<'s, str> {
	let dir = Path::new(parent).parent().unwrap_or_else(|| Path::new(""));
	let joined = normalize_path(&dir.join(name));
	Cow::Owned(joined.to_string_lossy().into_owned())
}

/// Lexically remove `.` and `..` segments.
fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => normalized.push(".."),
				}
			}
			other => normalized.push(other),
		}
	}
	normalized
}

fn register_builtins(env: &mut Environment<'static>, image_base_path: &str) {
	env.add_filter("nl2br", |value: String| line_breaks(&value));

	let base = image_base_path.to_string();
	env.add_function("icon", move |name: String| icon_markup(&name, &base));
}
