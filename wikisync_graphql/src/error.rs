use thiserror::Error;

/// Error code Wiki.js reports when a page lookup finds nothing.
pub const PAGE_NOT_FOUND_CODE: i64 = 6003;

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphqlMessage {
	pub message: String,
	/// Wiki.js error code from `extensions.exception.code`, when present.
	pub code: Option<i64>,
}

impl std::fmt::Display for GraphqlMessage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.code {
			Some(code) => write!(f, "{} (error code {code})", self.message),
			None => f.write_str(&self.message),
		}
	}
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphqlError {
	#[error("request to `{endpoint}` failed: {source}")]
	Http {
		endpoint: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("graphql errors: {}", join_messages(.0))]
	Graphql(Vec<GraphqlMessage>),

	#[error("response is missing `{0}`")]
	MissingField(String),

	#[error("failed to decode response: {0}")]
	Decode(#[from] serde_json::Error),

	#[error("login failed for `{0}`")]
	LoginFailed(String),

	#[error("environment variable `{0}` is not set")]
	MissingSetting(&'static str),
}

impl GraphqlError {
	/// Whether every reported GraphQL error means "page does not exist".
	pub fn is_not_found(&self) -> bool {
		match self {
			Self::Graphql(messages) => {
				!messages.is_empty()
					&& messages
						.iter()
						.all(|message| message.code == Some(PAGE_NOT_FOUND_CODE))
			}
			_ => false,
		}
	}
}

fn join_messages(messages: &[GraphqlMessage]) -> String {
	messages
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}

pub type GraphqlResult<T> = Result<T, GraphqlError>;
