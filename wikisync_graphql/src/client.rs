use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use wikisync_core::CreateResult;
use wikisync_core::NewPage;
use wikisync_core::PageUpdate;
use wikisync_core::RemotePage;
use wikisync_core::ResponseResult;
use wikisync_core::WikiClient;
use wikisync_core::WikiError;
use wikisync_core::WikiResult;

use crate::GraphqlError;
use crate::GraphqlMessage;
use crate::GraphqlResult;
use crate::PageDetails;
use crate::PageListItem;
use crate::PageTag;
use crate::queries;
use crate::types::LoginPayload;
use crate::types::MutationPayload;

/// Environment variable holding the wiki's base url.
pub const WIKI_URL_VAR: &str = "WIKI_URL";
/// Environment variable holding the API token sent as a bearer token.
pub const WIKI_API_TOKEN_VAR: &str = "WIKI_API_TOKEN";
/// Page count requested by [`WikiJsClient::list_pages`] callers that do not
/// choose one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the Wiki.js GraphQL API.
pub struct WikiJsClient {
	endpoint: String,
	api_token: Option<String>,
	http: reqwest::blocking::Client,
}

impl std::fmt::Debug for WikiJsClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WikiJsClient")
			.field("endpoint", &self.endpoint)
			.field("has_token", &self.api_token.is_some())
			.finish_non_exhaustive()
	}
}

impl WikiJsClient {
	/// Client for the wiki at `base_url`. Without a token, [`Self::login`]
	/// has to succeed before authenticated requests are accepted.
	pub fn new(base_url: &str, api_token: Option<String>) -> GraphqlResult<Self> {
		let endpoint = graphql_endpoint(base_url);
		let http = reqwest::blocking::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|source| {
				GraphqlError::Http {
					endpoint: endpoint.clone(),
					source,
				}
			})?;

		Ok(Self {
			endpoint,
			api_token: api_token.filter(|token| !token.is_empty()),
			http,
		})
	}

	/// Client configured from `WIKI_URL` and `WIKI_API_TOKEN`, falling back
	/// to `fallback_url` when `WIKI_URL` is unset.
	pub fn from_env(fallback_url: Option<&str>) -> GraphqlResult<Self> {
		let url = match std::env::var(WIKI_URL_VAR) {
			Ok(url) if !url.is_empty() => url,
			_ => {
				fallback_url
					.ok_or(GraphqlError::MissingSetting(WIKI_URL_VAR))?
					.to_string()
			}
		};
		Self::new(&url, std::env::var(WIKI_API_TOKEN_VAR).ok())
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn has_token(&self) -> bool {
		self.api_token.is_some()
	}

	/// Exchange credentials for a token used by every later request.
	pub fn login(&mut self, email: &str, password: &str) -> GraphqlResult<()> {
		let data = self.graphql_request(
			queries::LOGIN,
			json!({ "email": email, "password": password }),
			false,
		)?;
		let payload: LoginPayload = decode_at(data, &["auth", "login"])?;

		match payload.jwt {
			Some(jwt) if !jwt.is_empty() => {
				tracing::debug!(email, "logged in");
				self.api_token = Some(jwt);
				Ok(())
			}
			_ => Err(GraphqlError::LoginFailed(email.to_string())),
		}
	}

	/// Post `query` with `variables` and return the response's `data`.
	pub fn graphql_request(
		&self,
		query: &str,
		variables: Value,
		include_auth: bool,
	) -> GraphqlResult<Value> {
		let payload = json!({ "query": query, "variables": variables });
		let mut request = self.http.post(&self.endpoint).json(&payload);
		if let Some(token) = self.api_token.as_ref().filter(|_| include_auth) {
			request = request.bearer_auth(token);
		}

		let http_error = |source: reqwest::Error| {
			GraphqlError::Http {
				endpoint: self.endpoint.clone(),
				source,
			}
		};
		let body: Value = request
			.send()
			.and_then(reqwest::blocking::Response::error_for_status)
			.map_err(http_error)?
			.json()
			.map_err(http_error)?;

		parse_response(body)
	}

	pub fn get_page(&self, id: i64) -> GraphqlResult<Option<PageDetails>> {
		let response = self.graphql_request(queries::GET_PAGE, json!({ "id": id }), true);
		optional_page(response, &["pages", "single"])
	}

	/// The page stored at `path` in `locale`, or `None` when there is none.
	pub fn get_page_by_path(&self, path: &str, locale: &str) -> GraphqlResult<Option<PageDetails>> {
		let response = self.graphql_request(
			queries::GET_PAGE_BY_PATH,
			json!({ "path": path, "locale": locale }),
			true,
		);
		optional_page(response, &["pages", "singleByPath"])
	}

	/// Up to `limit` pages ordered by title.
	pub fn list_pages(&self, limit: u32) -> GraphqlResult<Vec<PageListItem>> {
		let data = self.graphql_request(queries::LIST_PAGES, json!({ "limit": limit }), true)?;
		decode_at(data, &["pages", "list"])
	}

	pub fn create_page(&self, page: &NewPage) -> GraphqlResult<CreateResult> {
		tracing::debug!(path = %page.path, locale = %page.locale, "creating page");
		let data = self.graphql_request(queries::CREATE_PAGE, create_variables(page), true)?;
		mutation_result(data, &["pages", "create"])
	}

	pub fn update_page(&self, update: &PageUpdate) -> GraphqlResult<ResponseResult> {
		tracing::debug!(id = update.id, "updating page");
		let data = self.graphql_request(queries::UPDATE_PAGE, update_variables(update)?, true)?;
		mutation_result(data, &["pages", "update"]).map(|created| created.result)
	}

	pub fn delete_page(&self, id: i64) -> GraphqlResult<ResponseResult> {
		tracing::debug!(id, "deleting page");
		let data = self.graphql_request(queries::DELETE_PAGE, json!({ "id": id }), true)?;
		mutation_result(data, &["pages", "delete"]).map(|deleted| deleted.result)
	}

	/// Every tag known to the wiki.
	pub fn get_tags(&self) -> GraphqlResult<Vec<PageTag>> {
		let data = self.graphql_request(queries::GET_TAGS, json!({}), true)?;
		decode_at(data, &["pages", "tags"])
	}
}

impl WikiClient for WikiJsClient {
	fn lookup_page(&self, locale: &str, path: &str) -> WikiResult<Option<RemotePage>> {
		self.get_page_by_path(path, locale)
			.map(|page| page.map(RemotePage::from))
			.map_err(|e| WikiError::remote(format!("lookup of `{path}`"), e.to_string()))
	}

	fn create_page(&self, page: &NewPage) -> WikiResult<CreateResult> {
		WikiJsClient::create_page(self, page)
			.map_err(|e| WikiError::remote(format!("create of `{}`", page.path), e.to_string()))
	}

	fn update_page(&self, update: &PageUpdate) -> WikiResult<ResponseResult> {
		WikiJsClient::update_page(self, update)
			.map_err(|e| WikiError::remote(format!("update of page {}", update.id), e.to_string()))
	}
}

pub(crate) fn graphql_endpoint(base_url: &str) -> String {
	format!("{}/graphql", base_url.trim_end_matches('/'))
}

/// Split a response body into its `data`, turning a non-empty `errors`
/// array into an error.
pub(crate) fn parse_response(mut body: Value) -> GraphqlResult<Value> {
	let errors = body
		.get("errors")
		.and_then(Value::as_array)
		.filter(|errors| !errors.is_empty());
	if let Some(errors) = errors {
		let messages = errors
			.iter()
			.map(|error| {
				GraphqlMessage {
					message: error
						.get("message")
						.and_then(Value::as_str)
						.unwrap_or("unknown error")
						.to_string(),
					code: error
						.pointer("/extensions/exception/code")
						.or_else(|| error.pointer("/extensions/code"))
						.and_then(Value::as_i64),
				}
			})
			.collect();
		return Err(GraphqlError::Graphql(messages));
	}

	match body.get_mut("data").map(Value::take) {
		Some(Value::Null) | None => Err(GraphqlError::MissingField("data".to_string())),
		Some(data) => Ok(data),
	}
}

/// Deserialize the value found by walking `path` from `data`.
pub(crate) fn decode_at<T: DeserializeOwned>(mut data: Value, path: &[&str]) -> GraphqlResult<T> {
	for key in path {
		data = match data.get_mut(*key).map(Value::take) {
			Some(value) => value,
			None => return Err(GraphqlError::MissingField(path.join("."))),
		};
	}
	Ok(serde_json::from_value(data)?)
}

fn optional_page(
	response: GraphqlResult<Value>,
	path: &[&str],
) -> GraphqlResult<Option<PageDetails>> {
	match response {
		Ok(data) => decode_at(data, path),
		Err(error) if error.is_not_found() => Ok(None),
		Err(error) => Err(error),
	}
}

pub(crate) fn mutation_result(data: Value, path: &[&str]) -> GraphqlResult<CreateResult> {
	let payload: MutationPayload = decode_at(data, path)?;
	let result = payload
		.response_result
		.ok_or_else(|| GraphqlError::MissingField(format!("{}.responseResult", path.join("."))))?;

	Ok(CreateResult {
		result,
		page_id: payload.page.map(|page| page.id),
	})
}

pub(crate) fn create_variables(page: &NewPage) -> Value {
	json!({
		"content": page.content,
		"description": "",
		"editor": page.editor,
		"isPublished": true,
		"isPrivate": false,
		"locale": page.locale,
		"path": page.path,
		"tags": page.tags,
		"title": page.title,
	})
}

pub(crate) fn update_variables(update: &PageUpdate) -> GraphqlResult<Value> {
	let mut variables = serde_json::to_value(update)?;
	if let Some(object) = variables.as_object_mut() {
		object.insert("isPublished".to_string(), Value::Bool(true));
		object.insert("isPrivate".to_string(), Value::Bool(false));
	}
	Ok(variables)
}
