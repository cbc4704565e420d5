//! Thread-safe in-memory [`SessionStore`] for embedding hosts and tests.

// self
use crate::{
	_prelude::*,
	auth::SessionState,
	store::{SessionStore, StoreError, StoreFuture},
};

/// Session store that keeps the state in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<SessionState>>);
impl MemoryStore {
	/// Creates a store seeded with `state`.
	pub fn with_state(state: SessionState) -> Self {
		Self(Arc::new(RwLock::new(state)))
	}

	/// Returns a copy of the current state without going through the async contract.
	pub fn snapshot(&self) -> SessionState {
		self.0.read().clone()
	}
}
impl SessionStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, SessionState> {
		let state = self.snapshot();

		Box::pin(async move { Ok::<_, StoreError>(state) })
	}

	fn save(&self, state: SessionState) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.0.write() = state;

			Ok::<_, StoreError>(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			*self.0.write() = SessionState::default();

			Ok::<_, StoreError>(())
		})
	}
}
