//! Data transformations applied to a node's raw data before it reaches the
//! template engine.

use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;
use serde_json::Map;
use serde_json::Value;

use crate::WikiError;
use crate::WikiResult;
use crate::config::DEFAULT_IMAGE_BASE_PATH;

/// Matches `${name}` icon placeholders. Names are restricted to ascii
/// letters, digits, `_` and `-`.
static ICON_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z0-9_-]+)\}").unwrap_or_else(|e| panic!("{e}")));

/// A transformation applied to a node's data mapping before templating.
///
/// The node tree only calls this through a `&dyn PreRenderer`, so strategies
/// can be swapped without touching the tree or the templates.
pub trait PreRenderer {
	/// Transform `content`, which must be a JSON object.
	fn render(&self, content: &Value) -> WikiResult<Map<String, Value>>;
}

/// The canonical strategy: converts newlines to `<br>` and expands `${name}`
/// placeholders into `<img>` references, recursively through objects and
/// arrays.
#[derive(Debug, Clone)]
pub struct HtmlPreRenderer {
	image_base_path: String,
}

impl Default for HtmlPreRenderer {
	fn default() -> Self {
		Self::new(DEFAULT_IMAGE_BASE_PATH)
	}
}

impl HtmlPreRenderer {
	pub fn new(image_base_path: impl Into<String>) -> Self {
		Self {
			image_base_path: image_base_path.into(),
		}
	}

	pub fn image_base_path(&self) -> &str {
		&self.image_base_path
	}

	/// Apply both string transformations: line breaks first, then icons.
	pub fn render_str(&self, content: &str) -> String {
		expand_icons(&line_breaks(content), &self.image_base_path)
	}

	fn render_value(&self, value: &Value) -> Value {
		match value {
			Value::Object(map) => Value::Object(self.render_map(map)),
			Value::Array(items) => Value::Array(items.iter().map(|v| self.render_value(v)).collect()),
			Value::String(s) => Value::String(self.render_str(s)),
			other => other.clone(),
		}
	}

	fn render_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
		map.iter()
			.map(|(key, value)| (key.clone(), self.render_value(value)))
			.collect()
	}
}

impl PreRenderer for HtmlPreRenderer {
	fn render(&self, content: &Value) -> WikiResult<Map<String, Value>> {
		let Value::Object(map) = content else {
			return Err(WikiError::NotAMapping(json_type_name(content).to_string()));
		};

		Ok(self.render_map(map))
	}
}

/// Passes data through untouched. Useful where templates do their own
/// formatting, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreRenderer;

impl PreRenderer for IdentityPreRenderer {
	fn render(&self, content: &Value) -> WikiResult<Map<String, Value>> {
		match content {
			Value::Object(map) => Ok(map.clone()),
			other => Err(WikiError::NotAMapping(json_type_name(other).to_string())),
		}
	}
}

/// Replace every newline with an html line break.
pub fn line_breaks(content: &str) -> String {
	content.replace('\n', "<br>")
}

/// Replace every `${name}` placeholder with an image reference under
/// `image_base_path`.
pub fn expand_icons(content: &str, image_base_path: &str) -> String {
	ICON_PATTERN
		.replace_all(content, |caps: &Captures<'_>| {
			icon_markup(&caps[1], image_base_path)
		})
		.into_owned()
}

/// The `<img>` reference for a single icon.
pub fn icon_markup(name: &str, image_base_path: &str) -> String {
	let base = image_base_path.trim_end_matches('/');
	format!(
		r#"<img src="{base}/{name}.png" alt="{name}" style="height: 1em; vertical-align: -0.15em;">"#
	)
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}
