//! The remote wiki as seen by the uploader. Implemented over GraphQL by
//! `wikisync_graphql`.

use serde::Deserialize;
use serde::Serialize;

use crate::WikiResult;

/// A page stored on the remote wiki.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePage {
	pub id: i64,
	pub path: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub locale: Option<String>,
}

/// A page to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
	pub title: String,
	pub locale: String,
	pub path: String,
	pub content: String,
	pub editor: String,
	pub tags: Vec<String>,
}

/// Changes applied to an existing page. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
	pub id: i64,
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub script_css: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub script_js: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub editor: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tags: Option<Vec<String>>,
}

/// Outcome reported by a create or update mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResult {
	pub succeeded: bool,
	#[serde(default)]
	pub error_code: Option<i64>,
	#[serde(default)]
	pub message: Option<String>,
}

impl ResponseResult {
	/// Description used when the wiki reports a failure.
	pub fn failure_message(&self) -> String {
		match (&self.message, self.error_code) {
			(Some(message), Some(code)) => format!("{message} (error code {code})"),
			(Some(message), None) => message.clone(),
			(None, Some(code)) => format!("error code {code}"),
			(None, None) => "no message".to_string(),
		}
	}
}

/// Result of a create mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateResult {
	pub result: ResponseResult,
	/// Id assigned to the new page, when the wiki returned one.
	pub page_id: Option<i64>,
}

/// Request/response operations the uploader needs from the remote wiki.
///
/// Implementations report transport failures and empty responses as
/// [`WikiError::Remote`](crate::WikiError::Remote); a response that arrived
/// but reports `succeeded: false` is returned as-is for the caller to judge.
pub trait WikiClient {
	fn lookup_page(&self, locale: &str, path: &str) -> WikiResult<Option<RemotePage>>;

	fn create_page(&self, page: &NewPage) -> WikiResult<CreateResult>;

	fn update_page(&self, update: &PageUpdate) -> WikiResult<ResponseResult>;
}
