//! The authenticated request gateway and its session operations.
//!
//! Every outbound call reads the stored credential, attaches it as a bearer header, and hands
//! the request to the transport. A first 401 enters the single-flight refresh protocol in
//! [`refresh`]; everything else (2xx responses, other statuses, network failures) is returned to
//! the caller untouched.

pub mod refresh;

mod navigator;
mod queue;

pub use navigator::*;
pub use refresh::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, SessionState, TokenResponse, TokenSecret},
	config::GatewayConfig,
	error::ResponseError,
	gateway::queue::{Attempt, RefreshState},
	http::{ApiRequest, ApiResponse, GatewayTransport, OutboundRequest},
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Authenticated gateway in front of the console backend.
///
/// The gateway owns the refresh flag, the waiter queue, and the credential generation, so two
/// gateways never share refresh state. Clones share all of it and can be handed to concurrent
/// tasks freely.
pub struct Gateway<C>
where
	C: ?Sized + GatewayTransport,
{
	/// Transport used for every outbound request, including the refresh call.
	pub transport: Arc<C>,
	/// Store holding the credential and session flags.
	pub store: Arc<dyn SessionStore>,
	/// Hook invoked when a failed refresh drops the session.
	pub navigator: Arc<dyn SessionNavigator>,
	/// Validated configuration.
	pub config: GatewayConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh: Arc<Mutex<RefreshState>>,
}
impl<C> Gateway<C>
where
	C: ?Sized + GatewayTransport,
{
	/// Creates a gateway around a caller-provided transport.
	pub fn with_transport(
		config: GatewayConfig,
		store: Arc<dyn SessionStore>,
		navigator: Arc<dyn SessionNavigator>,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			navigator,
			config,
			refresh_metrics: Default::default(),
			refresh: Default::default(),
		}
	}

	/// Sends `request` with the current credential attached.
	///
	/// A first 401 triggers at most one credential refresh shared with every concurrent caller,
	/// after which the request is replayed once. Non-401 failures are returned as-is.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: OpKind = OpKind::Send;

		let span = OpSpan::new(KIND, "send");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.dispatch(Attempt::new(request))).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Number of requests currently waiting on an in-flight refresh.
	pub fn pending_requests(&self) -> usize {
		self.refresh.lock().queue.len()
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn refresh_in_flight(&self) -> bool {
		self.refresh.lock().in_flight
	}

	/// Counters for refresh attempts, outcomes, queued waiters, and replays.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	/// Exchanges e-mail and password for a credential and persists the new session.
	///
	/// Rejected credentials surface as [`Error::Status`]; this call never enters the refresh
	/// protocol.
	pub async fn login(&self, request: &LoginRequest) -> Result<SessionState> {
		const KIND: OpKind = OpKind::Login;

		let span = OpSpan::new(KIND, "login");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let api_request = ApiRequest::post(self.config.login_path.as_str()).json(request)?;
				let TokenResponse { token } =
					self.execute(&api_request, None).await?.json::<TokenResponse>()?;

				if token.is_blank() {
					return Err(ResponseError::MissingToken.into());
				}

				let state = SessionState::issued(token);

				self.store.save(state.clone()).await?;

				Ok::<_, Error>(state)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Clears the session and sends the navigator to the login route.
	pub async fn logout(&self) -> Result<()> {
		obs::record_op_outcome(OpKind::Logout, OpOutcome::Attempt);

		self.store.clear().await?;
		self.navigator.redirect_to_login(&self.config.login_route);
		obs::record_op_outcome(OpKind::Logout, OpOutcome::Success);

		Ok(())
	}

	/// Loads the persisted session.
	pub async fn session_state(&self) -> Result<SessionState> {
		Ok(self.store.load().await?)
	}

	/// Returns `true` when no credential is held or it expired at or before `now`.
	pub async fn session_expired_at(&self, now: OffsetDateTime) -> Result<bool> {
		Ok(self.session_state().await?.is_expired_at(now))
	}

	async fn dispatch(&self, attempt: Attempt) -> Result<ApiResponse> {
		// Read the generation before the credential so a rotation in between is detected.
		let generation = self.refresh.lock().generation;
		let credential = self.current_credential().await?;

		match self.execute(&attempt.request, credential.as_ref()).await {
			Err(e) if e.is_unauthorized() && !attempt.retried =>
				self.recover(attempt, generation).await,
			result => result,
		}
	}

	pub(crate) async fn current_credential(&self) -> Result<Option<TokenSecret>> {
		let state = self.store.load().await?;

		Ok(state.token.filter(|token| !token.is_blank()))
	}

	/// Resolves and executes a single request, mapping non-2xx responses to [`Error::Status`].
	pub(crate) async fn execute(
		&self,
		request: &ApiRequest,
		credential: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		let outbound = OutboundRequest::resolve(&self.config, request, credential)?;
		let response = self.transport.execute(outbound).await?;

		if response.is_success() { Ok(response) } else { Err(response.into_status_error()) }
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway with its own cookie-aware reqwest transport.
	pub fn new(
		config: GatewayConfig,
		store: Arc<dyn SessionStore>,
		navigator: Arc<dyn SessionNavigator>,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_transport(config, store, navigator, ReqwestTransport::new()?))
	}
}
impl<C> Clone for Gateway<C>
where
	C: ?Sized + GatewayTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			navigator: self.navigator.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + GatewayTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("config", &self.config)
			.field("refresh_in_flight", &self.refresh_in_flight())
			.field("pending_requests", &self.pending_requests())
			.finish()
	}
}
