// crates.io
use ::http::{
	HeaderMap, HeaderValue, Method,
	header::{AUTHORIZATION, HeaderName},
};
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TokenSecret, config::GatewayConfig, error::ConfigError};

/// Request descriptor handed to [`Gateway::send`](crate::gateway::Gateway::send).
///
/// Paths are relative to the configured base URL. Descriptors are plain values: the gateway
/// clones them for replays and never mutates the caller's copy.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base URL.
	pub path: String,
	/// Query pairs appended in order.
	pub query: Vec<(String, String)>,
	/// Extra headers; `Authorization` is overwritten when a credential is present.
	pub headers: HeaderMap,
	/// Request payload.
	pub body: RequestBody,
	/// Per-request timeout overriding the configured default.
	pub timeout: Option<Duration>,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: RequestBody::Empty,
			timeout: None,
		}
	}

	/// `GET` request for `path`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// `POST` request for `path`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// `PUT` request for `path`.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// `PATCH` request for `path`.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// `DELETE` request for `path`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets a header, replacing any previous value.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<T>(self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		Ok(self.json_value(serde_json::to_value(body)?))
	}

	/// Uses an already-built JSON value as the payload.
	pub fn json_value(mut self, body: Value) -> Self {
		self.body = RequestBody::Json(body);

		self
	}

	/// Uses a multipart form as the payload.
	pub fn multipart(mut self, form: MultipartForm) -> Self {
		self.body = RequestBody::Multipart(form);

		self
	}

	/// Bounds this request with `timeout`.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Request payload variants.
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// JSON document sent as `application/json`.
	Json(Value),
	/// `multipart/form-data` payload.
	Multipart(MultipartForm),
}

/// Ordered multipart form; repeated names (`files[]`) are kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MultipartForm {
	/// Parts in the order they are sent.
	pub parts: Vec<MultipartPart>,
}
impl MultipartForm {
	/// Appends a text field.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parts.push(MultipartPart { name: name.into(), content: PartContent::Text(value.into()) });

		self
	}

	/// Appends a file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		file_name: impl Into<String>,
		content_type: Option<String>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		self.parts.push(MultipartPart {
			name: name.into(),
			content: PartContent::File {
				file_name: file_name.into(),
				content_type,
				bytes: bytes.into(),
			},
		});

		self
	}

	/// Returns the text values of every part named `name`, in order.
	pub fn text_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.parts.iter().filter(move |part| part.name == name).filter_map(|part| {
			match &part.content {
				PartContent::Text(value) => Some(value.as_str()),
				PartContent::File { .. } => None,
			}
		})
	}
}

/// Single multipart field.
#[derive(Clone, Debug)]
pub struct MultipartPart {
	/// Field name.
	pub name: String,
	/// Field payload.
	pub content: PartContent,
}

/// Multipart field payloads.
#[derive(Clone)]
pub enum PartContent {
	/// Plain text value.
	Text(String),
	/// File upload.
	File {
		/// File name reported to the backend.
		file_name: String,
		/// Optional MIME type.
		content_type: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}
impl Debug for PartContent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
			Self::File { file_name, content_type, bytes } => f
				.debug_struct("File")
				.field("file_name", file_name)
				.field("content_type", content_type)
				.field("len", &bytes.len())
				.finish(),
		}
	}
}

/// Fully resolved request executed by a [`GatewayTransport`](crate::http::GatewayTransport).
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL including query pairs.
	pub url: Url,
	/// Headers, including `Authorization` when a credential was attached.
	pub headers: HeaderMap,
	/// Request payload.
	pub body: RequestBody,
	/// Effective timeout, if any.
	pub timeout: Option<Duration>,
}
impl OutboundRequest {
	/// Resolves `request` against `config`, attaching `credential` as a bearer header.
	pub fn resolve(
		config: &GatewayConfig,
		request: &ApiRequest,
		credential: Option<&TokenSecret>,
	) -> Result<Self, ConfigError> {
		let mut url = config.resolve(&request.path)?;

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(request.query.iter());
		}

		let mut headers = request.headers.clone();

		if let Some(token) = credential {
			let mut value = HeaderValue::from_str(&token.bearer())
				.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		Ok(Self {
			method: request.method.clone(),
			url,
			headers,
			body: request.body.clone(),
			timeout: request.timeout.or(config.request_timeout),
		})
	}

	/// Returns the bearer token carried by this request, if any.
	pub fn bearer(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
	}
}
