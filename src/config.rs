//! Gateway configuration: backend location, auth endpoint paths, and timeouts.
//!
//! Values are validated once by [`GatewayConfigBuilder::build`] so the gateway can join request
//! paths without re-checking the base URL on every call.

/// Builder API for assembling gateway configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Immutable gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// Backend base URL; request paths are appended to it.
	pub base_url: Url,
	/// Path of the login endpoint.
	pub login_path: String,
	/// Path of the credential rotation endpoint.
	pub refresh_path: String,
	/// Unauthenticated entry point handed to the navigator when the session is dropped.
	pub login_route: String,
	/// Upper bound for a single refresh call.
	pub refresh_timeout: Duration,
	/// Default timeout applied to requests that do not carry their own.
	pub request_timeout: Option<Duration>,
}
impl GatewayConfig {
	/// Default login endpoint path.
	pub const DEFAULT_LOGIN_PATH: &'static str = "/auth/login";
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default unauthenticated entry point.
	pub const DEFAULT_LOGIN_ROUTE: &'static str = "/login";
	/// Default refresh timeout.
	pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(base_url)
	}

	/// Resolves a request path against the base URL.
	///
	/// Paths are appended to the base path (so `/releases` under `https://host/api` becomes
	/// `https://host/api/releases`) and may not carry their own query or fragment.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		if path.contains(['?', '#']) || path.contains("://") {
			return Err(ConfigError::InvalidPath { path: path.into() });
		}

		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.is_empty() {
			base.to_owned()
		} else if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&joined).map_err(|_| ConfigError::InvalidPath { path: path.into() })
	}
}
