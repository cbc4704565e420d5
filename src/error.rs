//! Gateway-level error types shared across the transport, session store, and refresh protocol.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout); no response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Credential refresh failed; the session has been cleared.
	#[error(transparent)]
	RefreshFailed(#[from] RefreshFailure),

	/// Backend answered with a non-success status.
	#[error("Request failed with HTTP {status}.")]
	Status {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Raw response body, lossily decoded as UTF-8.
		body: String,
	},
	/// A queued request lost its completion before the refresh settled.
	#[error("Queued request was abandoned before the credential refresh settled.")]
	RefreshAbandoned,
}
impl Error {
	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::RefreshFailed(failure) => failure.status,
			Self::Response(ResponseError::Parse { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` for an HTTP 401 answered by the backend.
	///
	/// Refresh failures are never reported as unauthorized so they cannot re-enter the refresh
	/// protocol.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot have request paths appended (opaque URL or embedded query).
	#[error("Base URL `{url}` cannot carry request paths.")]
	UnusableBaseUrl {
		/// Offending base URL.
		url: String,
	},
	/// Base URL uses a scheme other than HTTP(S).
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme that failed validation.
		scheme: String,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` is invalid.")]
	InvalidPath {
		/// Offending path.
		path: String,
	},
	/// Header value contains characters HTTP does not allow.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeader {
		/// Header name.
		name: String,
	},
	/// Multipart part could not be encoded.
	#[error("Multipart part `{name}` is invalid.")]
	InvalidMultipart {
		/// Part name.
		name: String,
		/// Underlying encoder failure.
		#[source]
		source: BoxError,
	},
	/// Request body could not be serialized as JSON.
	#[error("Request body could not be serialized as JSON.")]
	Serialize(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Backend responded with JSON that does not match the expected shape.
	#[error("Backend returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Login endpoint answered 2xx without a usable credential.
	#[error("Backend issued an empty credential.")]
	MissingToken,
}

/// Outcome of a failed credential refresh, cloned once per waiting request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Credential refresh failed: {message}.")]
pub struct RefreshFailure {
	/// HTTP status returned by the refresh endpoint, when one was received.
	pub status: Option<u16>,
	/// Human-readable failure summary.
	pub message: String,
}
impl RefreshFailure {
	/// Creates a failure for a refresh endpoint that answered with `status`.
	pub fn rejected(status: u16) -> Self {
		Self { status: Some(status), message: format!("refresh endpoint answered HTTP {status}") }
	}

	/// Creates a failure with no HTTP status (transport error, malformed response).
	pub fn other(message: impl Into<String>) -> Self {
		Self { status: None, message: message.into() }
	}

	/// Appends the reason the stale session could not be dropped after this failure.
	pub fn with_cleanup_error(mut self, err: impl Display) -> Self {
		self.message = format!("{}; session could not be cleared: {err}", self.message);

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_backend_401_counts_as_unauthorized() {
		let unauthorized = Error::Status { status: 401, body: String::new() };
		let forbidden = Error::Status { status: 403, body: String::new() };
		let refresh = Error::from(RefreshFailure::rejected(401));

		assert!(unauthorized.is_unauthorized());
		assert!(!forbidden.is_unauthorized());
		assert!(!refresh.is_unauthorized());
		assert_eq!(refresh.status(), Some(401));
	}

	#[test]
	fn refresh_failure_message_names_status() {
		let failure = RefreshFailure::rejected(403);

		assert_eq!(
			failure.to_string(),
			"Credential refresh failed: refresh endpoint answered HTTP 403."
		);
		assert_eq!(RefreshFailure::other("timeout").status, None);
	}

	#[test]
	fn cleanup_error_keeps_status_and_extends_message() {
		let failure = RefreshFailure::rejected(401).with_cleanup_error("disk full");

		assert_eq!(failure.status, Some(401));
		assert_eq!(
			failure.message,
			"refresh endpoint answered HTTP 401; session could not be cleared: disk full"
		);
	}
}
