//! File-backed [`SessionStore`] so a console session survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::SessionState,
	store::{SessionStore, StoreError, StoreFuture},
};

/// Persists the session to a JSON file after each mutation.
///
/// The file holds a single object keyed by `token`, `authenticated`, and `expires_at`.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<SessionState>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<SessionState, StoreError> {
		if !path.exists() {
			return Ok(SessionState::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(SessionState::default());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, state: &SessionState) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(state).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize session: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn replace(&self, state: SessionState) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		self.persist_locked(&state)?;
		*guard = state;

		Ok(())
	}
}
impl SessionStore for FileStore {
	fn load(&self) -> StoreFuture<'_, SessionState> {
		Box::pin(async move { Ok::<_, StoreError>(self.inner.read().clone()) })
	}

	fn save(&self, state: SessionState) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.replace(state) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.replace(SessionState::default()) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::TokenSecret;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"console_gateway_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let mut state = SessionState::issued(TokenSecret::new("T1"));

		state.expires_at = Some(1_700_000_000_000);

		rt.block_on(store.save(state.clone())).expect("Failed to save session to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store.");
		let loaded =
			rt.block_on(reopened.load()).expect("Failed to load session from file store.");

		assert_eq!(loaded, state);

		let raw = fs::read_to_string(&path).expect("Failed to read the session file.");

		assert!(raw.contains("\"token\": \"T1\""));
		assert!(raw.contains("\"authenticated\": true"));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session file {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_persists_empty_session() {
		let path = temp_path("clear");
		let store = FileStore::open(&path).expect("Failed to open file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(SessionState::issued(TokenSecret::new("T1"))))
			.expect("Failed to save session to file store.");
		rt.block_on(store.clear()).expect("Failed to clear file store.");

		let reopened = FileStore::open(&path).expect("Failed to reopen file store.");

		assert_eq!(reopened.inner.read().clone(), SessionState::default());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session file {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_file_is_reported() {
		let path = temp_path("corrupt");

		fs::write(&path, "{not json").expect("Failed to write corrupt fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt session files should be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary session file {}: {e}", path.display())
		});
	}
}
