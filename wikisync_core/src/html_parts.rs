use std::sync::LazyLock;

use regex::Regex;

use crate::WikiError;
use crate::WikiResult;

static DIV_TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)<(/)?div\b[^>]*>").unwrap_or_else(|e| panic!("{e}")));
static SCRIPT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap_or_else(|e| panic!("{e}"))
});
static STYLE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").unwrap_or_else(|e| panic!("{e}"))
});

/// The pieces of a full html document published separately to the wiki.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlParts {
	/// The main `<div>` element, tags included.
	pub html: String,
	/// The first `<script>` element, tags included.
	pub script: String,
	/// The inner text of the first `<style>` element.
	pub style: String,
}

/// Split a rendered html document into its main div, script and style.
///
/// With `main_div_id` the div carrying that `id` is used, otherwise the first
/// div in the document.
pub fn extract_html_parts(html: &str, main_div_id: Option<&str>) -> WikiResult<HtmlParts> {
	let body = extract_div(html, main_div_id)?;

	let script = SCRIPT_ELEMENT
		.find(html)
		.map(|m| m.as_str().to_string())
		.unwrap_or_default();
	if script.is_empty() {
		tracing::warn!("no script element found in html output");
	}

	let style = STYLE_ELEMENT
		.captures(html)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().trim().to_string())
		.unwrap_or_default();
	if style.is_empty() {
		tracing::warn!("no style element found in html output");
	}

	Ok(HtmlParts {
		html: body,
		script,
		style,
	})
}

fn extract_div(html: &str, main_div_id: Option<&str>) -> WikiResult<String> {
	let id_pattern = main_div_id
		.map(|id| {
			Regex::new(&format!(r#"\s(?i:id)\s*=\s*["']{}["']"#, regex::escape(id)))
				.map_err(|e| WikiError::HtmlExtract(e.to_string()))
		})
		.transpose()?;

	let mut start = None;
	let mut depth = 0usize;
	for caps in DIV_TAG.captures_iter(html) {
		let Some(tag) = caps.get(0) else {
			continue;
		};
		let is_closing = caps.get(1).is_some();

		let Some(start_offset) = start else {
			let selected = !is_closing
				&& id_pattern
					.as_ref()
					.is_none_or(|pattern| pattern.is_match(tag.as_str()));
			if selected {
				start = Some(tag.start());
				depth = 1;
			}
			continue;
		};

		if is_closing {
			depth -= 1;
			if depth == 0 {
				return Ok(html[start_offset..tag.end()].to_string());
			}
		} else {
			depth += 1;
		}
	}

	let reason = match (start, main_div_id) {
		(Some(_), _) => "main div is never closed".to_string(),
		(None, Some(id)) => format!("no div with id `{id}`"),
		(None, None) => "no div element".to_string(),
	};
	Err(WikiError::HtmlExtract(reason))
}
