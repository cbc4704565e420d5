//! Storage contracts and built-in backends for the persisted console session.
//!
//! The store plays the role of the console's client-side storage: it owns the bearer
//! credential, the `authenticated` flag, and the `expires_at` hint. The gateway reads it before
//! every request and writes it only on login, refresh, and logout.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::SessionState};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by session stores.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Loads the persisted session; an empty store yields [`SessionState::default`].
	fn load(&self) -> StoreFuture<'_, SessionState>;

	/// Persists `state`, replacing whatever was stored.
	fn save(&self, state: SessionState) -> StoreFuture<'_, ()>;

	/// Removes the credential and every session flag.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
