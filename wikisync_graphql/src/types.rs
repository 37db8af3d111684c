use serde::Deserialize;
use wikisync_core::RemotePage;

/// A page as returned by `pages.single` and `pages.singleByPath`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageDetails {
	pub id: i64,
	pub path: String,
	pub locale: Option<String>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub editor: Option<String>,
	pub is_published: Option<bool>,
	pub is_private: Option<bool>,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
	pub content: Option<String>,
	pub script_css: Option<String>,
	pub script_js: Option<String>,
	pub tags: Vec<PageTag>,
}

impl From<PageDetails> for RemotePage {
	fn from(page: PageDetails) -> Self {
		Self {
			id: page.id,
			path: page.path,
			title: page.title,
			locale: page.locale,
		}
	}
}

/// A tag attached to a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageTag {
	pub id: i64,
	pub tag: String,
	pub title: Option<String>,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
}

/// An entry of `pages.list`. Tags are plain names here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageListItem {
	pub id: i64,
	pub path: String,
	pub locale: Option<String>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub is_published: Option<bool>,
	pub is_private: Option<bool>,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
	pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct MutationPayload {
	pub response_result: Option<wikisync_core::ResponseResult>,
	pub page: Option<PageId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageId {
	pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginPayload {
	pub jwt: Option<String>,
	#[serde(rename = "responseResult")]
	pub response_result: Option<wikisync_core::ResponseResult>,
}
