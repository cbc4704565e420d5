//! Single-flight credential refresh with request queuing and replay.
//!
//! The first request to receive a 401 claims the in-flight flag and issues exactly one call to
//! the refresh endpoint. Requests that fail with 401 while that call is running are parked in the
//! queue with a one-shot completion. When the call settles:
//!
//! - on success the new credential is stored, the original request and every queued request are
//!   replayed concurrently with it, and each caller receives its own replay outcome;
//! - on failure the session is cleared, every waiter is rejected with its own copy of the
//!   failure, and the navigator is sent to the login route.
//!
//! The flag is released only once the queue is observed empty, so two refresh generations never
//! interleave. Replayed requests carry the retry marker and cannot start another refresh.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	auth::{SessionState, TokenResponse, TokenSecret},
	error::RefreshFailure,
	gateway::{
		Gateway,
		queue::{Admission, Attempt, PendingRequest, RefreshCycle},
	},
	http::{ApiRequest, ApiResponse, GatewayTransport},
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::StoreError,
};

impl<C> Gateway<C>
where
	C: ?Sized + GatewayTransport,
{
	/// Recovers a request whose first dispatch was answered with 401.
	///
	/// A request that read its credential before the last rotation is replayed with whatever the
	/// store holds now, which is no credential at all if the session was dropped in between.
	pub(crate) async fn recover(
		&self,
		attempt: Attempt,
		observed_generation: u64,
	) -> Result<ApiResponse> {
		match RefreshCycle::admit(&self.refresh, attempt.into_retry(), observed_generation) {
			Admission::Queued(waiter) => {
				self.refresh_metrics.record_queued();

				waiter.await.unwrap_or(Err(Error::RefreshAbandoned))
			},
			Admission::Rotated(attempt) => {
				let credential = self.current_credential().await?;

				self.replay(&attempt, credential.as_ref()).await
			},
			Admission::Leader(attempt, cycle) => self.lead_refresh(attempt, cycle).await,
		}
	}

	async fn lead_refresh(
		&self,
		attempt: Attempt,
		mut cycle: RefreshCycle<'_>,
	) -> Result<ApiResponse> {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "lead_refresh");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		match span.instrument(self.rotate_credential()).await {
			Ok(token) => {
				obs::record_op_outcome(KIND, OpOutcome::Success);
				self.refresh_metrics.record_success();
				cycle.rotated();

				let (original, ()) = future::join(
					self.replay(&attempt, Some(&token)),
					self.drain_with(&mut cycle, &token),
				)
				.await;

				original
			},
			Err(failure) => {
				obs::record_op_outcome(KIND, OpOutcome::Failure);
				self.refresh_metrics.record_failure();

				let failure = match self.drop_session().await {
					Ok(()) => failure,
					Err(err) => failure.with_cleanup_error(err),
				};
				let rejected = Self::reject_all(&mut cycle, &failure);

				obs::session_invalidated(rejected, failure.status);
				self.navigator.redirect_to_login(&self.config.login_route);

				Err(failure.into())
			},
		}
	}

	/// Calls the refresh endpoint and stores the credential it returns.
	async fn rotate_credential(&self) -> Result<TokenSecret, RefreshFailure> {
		let request =
			ApiRequest::post(self.config.refresh_path.as_str()).timeout(self.config.refresh_timeout);
		let response = match self.execute(&request, None).await {
			Ok(response) => response,
			Err(Error::Status { status, .. }) => return Err(RefreshFailure::rejected(status)),
			Err(err) => return Err(RefreshFailure::other(err.to_string())),
		};
		let TokenResponse { token } = response
			.json::<TokenResponse>()
			.map_err(|err| RefreshFailure::other(err.to_string()))?;

		if token.is_blank() {
			return Err(RefreshFailure::other("refresh endpoint returned an empty token"));
		}

		self.store
			.save(SessionState::issued(token.clone()))
			.await
			.map_err(|err| RefreshFailure::other(err.to_string()))?;

		Ok(token)
	}

	/// Drops the persisted session after a failed refresh.
	///
	/// When `clear` fails the store is overwritten with an empty session instead; the `clear`
	/// error is returned only if that fallback fails too.
	async fn drop_session(&self) -> Result<(), StoreError> {
		let Err(err) = self.store.clear().await else {
			return Ok(());
		};

		obs::session_clear_failed(&err);

		self.store.save(SessionState::default()).await.map_err(|_| err)
	}

	/// Replays queued requests with `token` until the queue is empty, then releases the flag.
	async fn drain_with(&self, cycle: &mut RefreshCycle<'_>, token: &TokenSecret) {
		while let Some(batch) = cycle.next_batch() {
			future::join_all(batch.into_iter().map(|PendingRequest { attempt, completion }| {
				async move {
					let outcome = self.replay(&attempt, Some(token)).await;

					// The waiter may have been dropped by its caller; nothing to deliver then.
					let _ = completion.send(outcome);
				}
			}))
			.await;
		}
	}

	/// Rejects every queued request with a copy of `failure`, then releases the flag.
	fn reject_all(cycle: &mut RefreshCycle<'_>, failure: &RefreshFailure) -> usize {
		let mut rejected = 0;

		while let Some(batch) = cycle.next_batch() {
			for PendingRequest { completion, .. } in batch {
				let _ = completion.send(Err(failure.clone().into()));

				rejected += 1;
			}
		}

		rejected
	}

	async fn replay(
		&self,
		attempt: &Attempt,
		credential: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		debug_assert!(attempt.retried, "Only retried attempts may be replayed.");

		self.refresh_metrics.record_replayed();
		self.execute(&attempt.request, credential).await
	}
}
