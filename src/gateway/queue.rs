//! Typed state behind the single-flight refresh: the in-flight flag, the waiter queue, and the
//! credential generation.

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiResponse},
};

/// Request descriptor paired with its one-shot retry marker.
#[derive(Clone, Debug)]
pub(crate) struct Attempt {
	pub(crate) request: ApiRequest,
	pub(crate) retried: bool,
}
impl Attempt {
	pub(crate) fn new(request: ApiRequest) -> Self {
		Self { request, retried: false }
	}

	/// Marks the attempt as replayed; a second 401 will propagate instead of refreshing again.
	pub(crate) fn into_retry(self) -> Self {
		Self { retried: true, ..self }
	}
}

/// Request suspended until the in-flight refresh settles.
pub(crate) struct PendingRequest {
	pub(crate) attempt: Attempt,
	pub(crate) completion: oneshot::Sender<Result<ApiResponse>>,
}

#[derive(Default)]
pub(crate) struct RefreshState {
	pub(crate) in_flight: bool,
	pub(crate) queue: Vec<PendingRequest>,
	/// Bumped every time a refresh cycle stores a new credential.
	pub(crate) generation: u64,
}

/// How a request that received its first 401 joins the refresh protocol.
pub(crate) enum Admission<'a> {
	/// A refresh is already running; wait for its outcome.
	Queued(oneshot::Receiver<Result<ApiResponse>>),
	/// The credential rotated after this request read it; replay with the current one.
	Rotated(Attempt),
	/// No refresh is running; this request issues it and owns the cycle.
	Leader(Attempt, RefreshCycle<'a>),
}

/// Ownership of the in-flight flag for the duration of one refresh cycle.
///
/// Dropping the cycle before [`RefreshCycle::next_batch`] reports an empty queue (for example
/// when the leading future is cancelled) resets the flag and drops every queued completion, so
/// waiters observe [`Error::RefreshAbandoned`] instead of hanging.
pub(crate) struct RefreshCycle<'a> {
	state: &'a Mutex<RefreshState>,
	settled: bool,
}
impl<'a> RefreshCycle<'a> {
	/// Claims the flag on behalf of `attempt`, or explains how it should wait instead.
	pub(crate) fn admit(
		state: &'a Mutex<RefreshState>,
		attempt: Attempt,
		observed_generation: u64,
	) -> Admission<'a> {
		let mut guard = state.lock();

		if guard.in_flight {
			let (completion, waiter) = oneshot::channel();

			guard.queue.push(PendingRequest { attempt, completion });

			Admission::Queued(waiter)
		} else if guard.generation != observed_generation {
			Admission::Rotated(attempt)
		} else {
			guard.in_flight = true;

			Admission::Leader(attempt, Self { state, settled: false })
		}
	}

	/// Records that this cycle stored a new credential.
	pub(crate) fn rotated(&self) {
		let mut guard = self.state.lock();

		guard.generation = guard.generation.wrapping_add(1);
	}

	/// Takes every queued request, or releases the flag when none are left.
	///
	/// Requests that enqueue while a batch is being replayed land in the next batch, so the flag
	/// is only released once the queue is observed empty under the lock.
	pub(crate) fn next_batch(&mut self) -> Option<Vec<PendingRequest>> {
		if self.settled {
			return None;
		}

		let mut guard = self.state.lock();

		if guard.queue.is_empty() {
			guard.in_flight = false;
			self.settled = true;

			return None;
		}

		Some(mem::take(&mut guard.queue))
	}
}
impl Drop for RefreshCycle<'_> {
	fn drop(&mut self) {
		if self.settled {
			return;
		}

		let abandoned = {
			let mut guard = self.state.lock();

			guard.in_flight = false;

			mem::take(&mut guard.queue)
		};

		drop(abandoned);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn attempt(path: &str) -> Attempt {
		Attempt::new(ApiRequest::get(path)).into_retry()
	}

	#[test]
	fn first_admission_leads_and_later_ones_queue() {
		let state = Mutex::new(RefreshState::default());
		let first = RefreshCycle::admit(&state, attempt("/releases"), 0);
		let second = RefreshCycle::admit(&state, attempt("/v1/approvals"), 0);

		assert!(matches!(first, Admission::Leader(..)));
		assert!(matches!(second, Admission::Queued(_)));
		assert_eq!(state.lock().queue.len(), 1);
	}

	#[test]
	fn stale_generation_replays_without_leading() {
		let state = Mutex::new(RefreshState { generation: 3, ..Default::default() });
		let admission = RefreshCycle::admit(&state, attempt("/releases/5"), 2);

		assert!(matches!(admission, Admission::Rotated(a) if a.retried));
		assert!(!state.lock().in_flight);
	}

	#[test]
	fn generation_moves_only_on_rotation() {
		let state = Mutex::new(RefreshState::default());
		let Admission::Leader(_, mut cycle) = RefreshCycle::admit(&state, attempt("/releases"), 0)
		else {
			panic!("First admission should lead the cycle.");
		};

		cycle.rotated();

		assert!(state.lock().in_flight);
		assert!(cycle.next_batch().is_none());
		assert!(!state.lock().in_flight);
		assert_eq!(state.lock().generation, 1);

		let Admission::Leader(_, mut cycle) = RefreshCycle::admit(&state, attempt("/releases"), 1)
		else {
			panic!("Second admission should lead a new cycle.");
		};

		assert!(cycle.next_batch().is_none());
		assert_eq!(state.lock().generation, 1);
	}

	#[test]
	fn dropped_cycle_abandons_waiters() {
		let state = Mutex::new(RefreshState::default());
		let leader = RefreshCycle::admit(&state, attempt("/releases"), 0);
		let queued = RefreshCycle::admit(&state, attempt("/entries/1"), 0);

		drop(leader);

		let Admission::Queued(mut waiter) = queued else {
			panic!("Second admission should have been queued.");
		};

		assert!(matches!(waiter.try_recv(), Err(oneshot::Canceled)));
		assert!(!state.lock().in_flight);
		assert!(state.lock().queue.is_empty());
	}
}
