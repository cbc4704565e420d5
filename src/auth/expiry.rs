//! Offline inspection of a bearer token's `exp` claim.
//!
//! Tokens are compact three-segment strings (`header.payload.signature`) whose payload is a
//! URL-safe, padding-stripped base64 JSON object. Nothing here verifies the signature; the
//! backend stays the authority on validity and the decoded instant is only a hint for proactive
//! session checks.

// crates.io
use base64::{
	Engine as _, alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::Value;
// self
use crate::_prelude::*;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Returns the token's `exp` claim in milliseconds since the Unix epoch.
///
/// Every failure (empty input, missing payload segment, invalid base64, invalid JSON, missing or
/// non-numeric `exp`) collapses to `0`.
pub fn expiry_millis(token: &str) -> i64 {
	decode_payload(token).and_then(|claims| exp_millis(&claims)).unwrap_or(0)
}

/// Returns the token's expiry as a timestamp, or `None` when [`expiry_millis`] yields `0`.
pub fn expires_at(token: &str) -> Option<OffsetDateTime> {
	millis_to_datetime(expiry_millis(token))
}

pub(crate) fn millis_to_datetime(millis: i64) -> Option<OffsetDateTime> {
	if millis == 0 {
		return None;
	}

	OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

fn decode_payload(token: &str) -> Option<Value> {
	let payload = token.split('.').nth(1)?;
	let normalized = payload
		.chars()
		.map(|c| match c {
			'-' => '+',
			'_' => '/',
			other => other,
		})
		.collect::<String>();
	let bytes = PAYLOAD_ENGINE.decode(normalized).ok()?;

	serde_json::from_slice(&bytes).ok()
}

fn exp_millis(claims: &Value) -> Option<i64> {
	let exp = claims.get("exp")?;

	if let Some(secs) = exp.as_i64() {
		return Some(secs.saturating_mul(1_000));
	}

	let secs = exp.as_f64().filter(|secs| secs.is_finite())?;

	Some((secs * 1_000.) as i64)
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::URL_SAFE_NO_PAD;
	// self
	use super::*;

	fn token_with_payload(payload: &str) -> String {
		format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(payload))
	}

	#[test]
	fn decodes_exp_into_milliseconds() {
		let token = token_with_payload(r#"{"sub":"42","exp":1700000000}"#);

		assert_eq!(expiry_millis(&token), 1_700_000_000_000);
		assert_eq!(expiry_millis(&token), expiry_millis(&token));
	}

	#[test]
	fn accepts_url_safe_characters_and_missing_padding() {
		let url_safe = token_with_payload(r#"{"exp":1,"note":"~~~?>"}"#);
		let unpadded = token_with_payload(r#"{"exp":2,"n":"ÿÿ"}"#);

		assert!(url_safe.contains('-') && url_safe.contains('_'));
		assert_eq!(expiry_millis(&url_safe), 1_000);
		assert!(!unpadded.contains('='));
		assert_eq!(expiry_millis(&unpadded), 2_000);
	}

	#[test]
	fn fractional_exp_is_truncated() {
		let token = token_with_payload(r#"{"exp":1.5}"#);

		assert_eq!(expiry_millis(&token), 1_500);
	}

	#[test]
	fn malformed_tokens_collapse_to_zero() {
		assert_eq!(expiry_millis(""), 0);
		assert_eq!(expiry_millis("no-separator"), 0);
		assert_eq!(expiry_millis("header.!!!not-base64!!!.sig"), 0);
		assert_eq!(expiry_millis(&token_with_payload("not json")), 0);
		assert_eq!(expiry_millis(&token_with_payload(r#"{"sub":"42"}"#)), 0);
		assert_eq!(expiry_millis(&token_with_payload(r#"{"exp":"soon"}"#)), 0);
	}

	#[test]
	fn expires_at_maps_zero_to_none() {
		let token = token_with_payload(r#"{"exp":1700000000}"#);

		assert_eq!(
			expires_at(&token),
			Some(time::macros::datetime!(2023-11-14 22:13:20 UTC))
		);
		assert_eq!(expires_at("garbage"), None);
	}
}
