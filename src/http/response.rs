// crates.io
use ::http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ResponseError};

/// Response returned by the backend, passed through the gateway unchanged on success.
#[derive(Clone)]
pub struct ApiResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
		Self { status, headers, body }
	}

	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Raw response body.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Deserializes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			ResponseError::Parse { source, status: self.status.as_u16() }.into()
		})
	}

	/// Converts a non-success response into [`Error::Status`].
	pub(crate) fn into_status_error(self) -> Error {
		let body = String::from_utf8_lossy(&self.body).into_owned();

		Error::Status { status: self.status.as_u16(), body }
	}
}
impl Debug for ApiResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiResponse")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.field("body_len", &self.body.len())
			.finish()
	}
}
