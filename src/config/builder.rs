// self
use crate::{_prelude::*, config::GatewayConfig, error::ConfigError};

/// Builder for [`GatewayConfig`] values.
#[derive(Debug)]
pub struct GatewayConfigBuilder {
	/// Backend base URL.
	pub base_url: Url,
	/// Login endpoint path.
	pub login_path: String,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Unauthenticated entry point.
	pub login_route: String,
	/// Upper bound for a single refresh call.
	pub refresh_timeout: Duration,
	/// Optional default request timeout.
	pub request_timeout: Option<Duration>,
}
impl GatewayConfigBuilder {
	/// Creates a new builder seeded with the provided base URL and default paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			login_path: GatewayConfig::DEFAULT_LOGIN_PATH.into(),
			refresh_path: GatewayConfig::DEFAULT_REFRESH_PATH.into(),
			login_route: GatewayConfig::DEFAULT_LOGIN_ROUTE.into(),
			refresh_timeout: GatewayConfig::DEFAULT_REFRESH_TIMEOUT,
			request_timeout: None,
		}
	}

	/// Parses `base_url` and seeds a builder with it.
	pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
		Url::parse(base_url)
			.map(Self::new)
			.map_err(|source| ConfigError::InvalidBaseUrl { source })
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the route the navigator receives when the session is dropped.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the refresh timeout (defaults to 30 seconds).
	pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	/// Sets a default timeout for requests that do not carry their own.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		let config = GatewayConfig {
			base_url: self.base_url,
			login_path: self.login_path,
			refresh_path: self.refresh_path,
			login_route: self.login_route,
			refresh_timeout: clamp_positive(self.refresh_timeout)
				.unwrap_or(GatewayConfig::DEFAULT_REFRESH_TIMEOUT),
			request_timeout: self.request_timeout.and_then(clamp_positive),
		};

		config.validate()?;

		Ok(config)
	}
}

impl GatewayConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		match self.base_url.scheme() {
			"http" | "https" => {},
			scheme => return Err(ConfigError::UnsupportedScheme { scheme: scheme.into() }),
		}

		if self.base_url.cannot_be_a_base() || self.base_url.query().is_some() {
			return Err(ConfigError::UnusableBaseUrl { url: self.base_url.to_string() });
		}

		self.resolve(&self.login_path)?;
		self.resolve(&self.refresh_path)?;

		Ok(())
	}
}

fn clamp_positive(timeout: Duration) -> Option<Duration> {
	timeout.is_positive().then_some(timeout)
}
