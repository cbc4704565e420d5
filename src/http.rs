//! Transport primitives for console API calls.
//!
//! [`GatewayTransport`] is the gateway's only dependency on an HTTP stack. The gateway resolves
//! every [`ApiRequest`] into an [`OutboundRequest`] (absolute URL, bearer header attached) and
//! hands it to the transport, which reports whatever status the backend answered with. Status
//! classification (2xx vs. 401 vs. other failures) stays in the gateway so custom transports only
//! have to move bytes.

mod request;
mod response;

pub use request::*;
pub use response::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use ::http::header::CONTENT_TYPE;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::error::{ConfigError, TransportError};

/// Boxed future returned by [`GatewayTransport::execute`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing console API calls.
///
/// Implementations must return `Ok` for every response the backend produced, including 4xx and
/// 5xx statuses, and reserve `Err` for failures where no response exists (DNS, TCP, TLS,
/// timeouts) or the request could not be encoded. The gateway relies on this split: only a
/// received 401 may start a credential refresh.
///
/// The refresh endpoint authenticates through an ambient session cookie, so transports used
/// against a real backend should keep a cookie store.
pub trait GatewayTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the backend's response.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestTransport::new`] enables reqwest's cookie store; configure any custom
/// [`ReqwestClient`] passed to [`ReqwestTransport::with_client`] the same way, otherwise the
/// refresh endpoint never sees the session cookie set at login.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a cookie-aware reqwest client.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn send(&self, request: OutboundRequest) -> Result<ApiResponse> {
		let OutboundRequest { method, url, headers, body, timeout } = request;
		let mut builder = self.0.request(method, url);

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout.unsigned_abs());
		}

		builder = match body {
			RequestBody::Empty => builder.headers(headers),
			RequestBody::Json(value) => {
				let builder = if headers.contains_key(CONTENT_TYPE) {
					builder
				} else {
					builder.header(CONTENT_TYPE, "application/json")
				};

				builder.headers(headers).body(value.to_string())
			},
			RequestBody::Multipart(form) =>
				builder.headers(headers).multipart(to_reqwest_form(form)?),
		};

		let response = builder.send().await.map_err(TransportError::from)?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(TransportError::from)?;

		Ok(ApiResponse::new(status, headers, body.to_vec()))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayTransport for ReqwestTransport {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(self.send(request))
	}
}

#[cfg(feature = "reqwest")]
fn to_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, ConfigError> {
	use reqwest::multipart::{Form, Part};

	let mut out = Form::new();

	for MultipartPart { name, content } in form.parts {
		out = match content {
			PartContent::Text(value) => out.text(name, value),
			PartContent::File { file_name, content_type, bytes } => {
				let mut part = Part::bytes(bytes).file_name(file_name);

				if let Some(content_type) = content_type {
					part = part.mime_str(&content_type).map_err(|e| {
						ConfigError::InvalidMultipart { name: name.clone(), source: Box::new(e) }
					})?;
				}

				out.part(name, part)
			},
		};
	}

	Ok(out)
}
