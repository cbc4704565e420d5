//! Persisted session model and the login/refresh wire payloads.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Session state persisted by a [`SessionStore`](crate::store::SessionStore).
///
/// Field names double as the fixed storage keys (`token`, `authenticated`, `expires_at`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
	/// Current bearer credential, if any.
	#[serde(default)]
	pub token: Option<TokenSecret>,
	/// Whether the console considers the user logged in.
	#[serde(default)]
	pub authenticated: bool,
	/// Millisecond epoch expiry hint recorded when the credential was issued.
	#[serde(default)]
	pub expires_at: Option<i64>,
}
impl SessionState {
	/// Builds an authenticated session for a freshly issued credential.
	///
	/// The expiry hint is taken from the token's `exp` claim when it can be decoded.
	pub fn issued(token: TokenSecret) -> Self {
		let millis = crate::auth::expiry_millis(token.expose());

		Self { token: Some(token), authenticated: true, expires_at: (millis != 0).then_some(millis) }
	}

	/// Returns the expiry instant, preferring the stored hint over the token's own claim.
	pub fn expires_at_datetime(&self) -> Option<OffsetDateTime> {
		self.expires_at
			.and_then(crate::auth::expiry::millis_to_datetime)
			.or_else(|| self.token.as_ref().and_then(|token| crate::auth::expires_at(token.expose())))
	}

	/// Returns `true` when no credential is held or its expiry is at or before `now`.
	///
	/// A credential without a decodable expiry is treated as live.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		if self.token.is_none() {
			return true;
		}

		self.expires_at_datetime().is_some_and(|expiry| expiry <= now)
	}
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
	/// Account e-mail address.
	pub email: String,
	/// Account password.
	pub password: String,
}
impl LoginRequest {
	/// Creates a login payload.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// `{token}` payload returned by the login and refresh endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Newly issued bearer credential.
	pub token: TokenSecret,
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	use time::macros;
	// self
	use super::*;

	fn token_expiring_at(exp: i64) -> TokenSecret {
		let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));

		TokenSecret::new(format!("e30.{payload}.sig"))
	}

	#[test]
	fn issued_session_records_expiry_hint() {
		let session = SessionState::issued(token_expiring_at(1_700_000_000));

		assert!(session.authenticated);
		assert_eq!(session.expires_at, Some(1_700_000_000_000));
	}

	#[test]
	fn opaque_token_has_no_hint_and_never_expires_locally() {
		let session = SessionState::issued(TokenSecret::new("opaque"));

		assert_eq!(session.expires_at, None);
		assert!(!session.is_expired_at(macros::datetime!(2100-01-01 00:00 UTC)));
	}

	#[test]
	fn expiry_check_prefers_stored_hint() {
		let mut session = SessionState::issued(token_expiring_at(1_700_000_000));

		session.expires_at = Some(1_600_000_000_000);

		assert!(session.is_expired_at(macros::datetime!(2021-01-01 00:00 UTC)));
		assert!(!session.is_expired_at(macros::datetime!(2020-01-01 00:00 UTC)));
		assert!(SessionState::default().is_expired_at(macros::datetime!(2020-01-01 00:00 UTC)));
	}

	#[test]
	fn session_serializes_with_fixed_keys() {
		let session = SessionState::issued(TokenSecret::new("T1"));
		let json = serde_json::to_value(&session).expect("Session should serialize to JSON.");

		assert_eq!(json["token"], "T1");
		assert_eq!(json["authenticated"], true);
		assert!(json["expires_at"].is_null());
	}

	#[test]
	fn login_request_debug_redacts_password() {
		let rendered = format!("{:?}", LoginRequest::new("ops@example.com", "hunter2"));

		assert!(!rendered.contains("hunter2"));
	}
}
