use std::path::Path;

use assert_cmd::Command;

pub fn wikisync_cmd() -> Command {
	let mut cmd = Command::cargo_bin("wikisync").unwrap_or_else(|e| panic!("binary: {e}"));
	cmd.env("NO_COLOR", "1")
		.env_remove("RUST_LOG")
		.env_remove("WIKI_URL")
		.env_remove("WIKI_API_TOKEN");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write: {e}"));
}

/// A small project with a markdown document and a directory of html cards.
#[allow(dead_code)]
pub fn write_project(root: &Path) {
	write_file(
		root,
		"data/zh/contents.json",
		r#"{
	"template": "page.md",
	"children": {
		"rules": { "data": "rules.md" },
		"card": { "index": "contents.json", "template": "card.html" }
	}
}"#,
	);
	write_file(root, "data/zh/rules.md", "Spend ${gold}\nto play.");
	write_file(
		root,
		"data/zh/card/contents.json",
		r#"{ "children": { "aP01": { "data": "aP01.json" }, "aP02": { "data": "aP02.json" } } }"#,
	);
	write_file(root, "data/zh/card/aP01.json", r#"{ "title": "Scout" }"#);
	write_file(root, "data/zh/card/aP02.json", r#"{ "title": "Guard" }"#);
	write_file(root, "data/zh/templates/page.md", "{{ text }}\n");
	write_file(
		root,
		"data/zh/templates/card.html",
		"<div id=\"main\"><h1>{{ title }}</h1></div>\n",
	);
}
