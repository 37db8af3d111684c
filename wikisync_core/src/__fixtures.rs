use std::cell::RefCell;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use crate::CreateResult;
use crate::NewPage;
use crate::PageUpdate;
use crate::RemotePage;
use crate::ResponseResult;
use crate::WikiClient;
use crate::WikiConfig;
use crate::WikiResult;

pub(crate) const CARD_TEMPLATE: &str = r#"<html>
<head>
<style>
  .card { color: red; }
</style>
</head>
<body>
<div id="main">
<h1>{{ title }}</h1>
{% if cost is defined %}
<p>Cost: {{ cost }}</p>
{% endif %}
<div class="text">{{ text }}</div>
</div>
<script>console.log("card");</script>
</body>
</html>
"#;

pub(crate) const FAQ_TEMPLATE: &str = "# {{ title }}\n\n{% for entry in entries %}\n- {{ \
                                       entry.q }}: {{ entry.a }}\n{% endfor %}\n";

/// Write `content` to `root/relative`, creating parent directories.
pub(crate) fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write: {e}"));
	path
}

/// Create a complete project under `root` with a `data/zh` content tree:
///
/// ```text
/// root (base.md)
/// ├── rules           document, inherits base.md
/// ├── card            directory with data, card.html
/// │   ├── aP01        document
/// │   ├── aP02        document
/// │   └── sets        directory without data
/// │       └── core    document
/// └── faq             document, faq.md
/// ```
pub(crate) fn sample_project(root: &Path) -> PathBuf {
	let locale = root.join("data/zh");
	write_file(
		&locale,
		"contents.json",
		r#"{
	"template": "base.md",
	"children": {
		"rules": { "data": "rules.md" },
		"card": { "index": "contents.json", "data": "card.json", "template": "card.html" },
		"faq": { "data": "faq.json", "template": "faq.md" }
	}
}"#,
	);
	write_file(&locale, "rules.md", "Play ${aP01}\nthen draw.");
	write_file(
		&locale,
		"card.json",
		r#"{ "title": "Cards", "text": "Every card\nin the game" }"#,
	);
	write_file(
		&locale,
		"card/contents.json",
		r#"{
	"children": {
		"aP01": { "data": "aP01.json" },
		"aP02": { "data": "aP02.json" },
		"sets": { "index": "contents.json" }
	}
}"#,
	);
	write_file(
		&locale,
		"card/aP01.json",
		r#"{ "title": "Scout", "cost": 2, "text": "Draw a card.\nGain ${eE01}." }"#,
	);
	write_file(
		&locale,
		"card/aP02.json",
		r#"{ "title": "Guard", "text": "Block.", "wiki": { "path": "cards/guard", "tags": ["defence"] } }"#,
	);
	write_file(
		&locale,
		"card/sets/contents.json",
		r#"{ "children": { "core": { "data": "core.json" } } }"#,
	);
	write_file(
		&locale,
		"card/sets/core.json",
		r#"{ "title": "Core set", "text": "Base cards." }"#,
	);
	write_file(
		&locale,
		"faq.json",
		r#"{ "title": "FAQ", "entries": [ { "q": "Who starts", "a": "Youngest" }, { "q": "Ties", "a": "Replay" } ] }"#,
	);
	write_file(&locale, "templates/base.md", "{{ text }}\n");
	write_file(&locale, "templates/card.html", CARD_TEMPLATE);
	write_file(&locale, "templates/faq.md", FAQ_TEMPLATE);

	locale
}

/// Config with no pause between post-create lookups.
pub(crate) fn test_config() -> WikiConfig {
	let mut config = WikiConfig::default();
	config.wiki.lookup_delay_ms = 0;
	config
}

/// What a [`MockClient`] has been asked to do.
#[derive(Debug, Default)]
pub(crate) struct MockState {
	/// Pages that exist remotely, by path.
	pub pages: Vec<RemotePage>,
	/// Lookups that return nothing before a created page becomes visible.
	pub hidden_lookups: usize,
	pub fail_create: bool,
	pub fail_update: bool,
	pub lookups: Vec<String>,
	pub creates: Vec<NewPage>,
	pub updates: Vec<PageUpdate>,
	next_id: i64,
}

/// In-memory [`WikiClient`] recording every call.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockClient {
	pub state: Rc<RefCell<MockState>>,
}

impl MockClient {
	pub(crate) fn with_pages(pages: &[(i64, &str)]) -> Self {
		let client = Self::default();
		{
			let mut state = client.state.borrow_mut();
			state.next_id = 100;
			state.pages = pages
				.iter()
				.map(|(id, path)| {
					RemotePage {
						id: *id,
						path: (*path).to_string(),
						title: None,
						locale: Some("zh".to_string()),
					}
				})
				.collect();
		}
		client
	}
}

impl WikiClient for MockClient {
	fn lookup_page(&self, _locale: &str, path: &str) -> WikiResult<Option<RemotePage>> {
		let mut state = self.state.borrow_mut();
		state.lookups.push(path.to_string());
		let found = state.pages.iter().find(|page| page.path == path).cloned();
		if found.is_some() && state.hidden_lookups > 0 && !state.creates.is_empty() {
			state.hidden_lookups -= 1;
			return Ok(None);
		}
		Ok(found)
	}

	fn create_page(&self, page: &NewPage) -> WikiResult<CreateResult> {
		let mut state = self.state.borrow_mut();
		state.creates.push(page.clone());
		if state.fail_create {
			return Ok(CreateResult {
				result: ResponseResult {
					succeeded: false,
					error_code: Some(6002),
					message: Some("page already exists".to_string()),
				},
				page_id: None,
			});
		}

		state.next_id += 1;
		let id = state.next_id;
		state.pages.push(RemotePage {
			id,
			path: page.path.clone(),
			title: Some(page.title.clone()),
			locale: Some(page.locale.clone()),
		});
		Ok(CreateResult {
			result: ResponseResult {
				succeeded: true,
				..ResponseResult::default()
			},
			page_id: Some(id),
		})
	}

	fn update_page(&self, update: &PageUpdate) -> WikiResult<ResponseResult> {
		let mut state = self.state.borrow_mut();
		state.updates.push(update.clone());
		Ok(ResponseResult {
			succeeded: !state.fail_update,
			error_code: None,
			message: state.fail_update.then(|| "forbidden".to_string()),
		})
	}
}
