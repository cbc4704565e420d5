//! Shared fixtures for the gateway integration suites.

#![allow(dead_code)]

// std
use std::{collections::HashMap, sync::Arc, time::Duration as StdDuration};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use tokio::sync::Notify;
// self
use console_gateway::{
	auth::{SessionState, TokenSecret},
	config::GatewayConfig,
	error::Error,
	gateway::{Gateway, RecordingNavigator},
	http::{ApiResponse, GatewayTransport, OutboundRequest, TransportFuture},
	store::MemoryStore,
	url::Url,
};

/// Builds a validated config for `base`.
pub fn config(base: &str) -> GatewayConfig {
	GatewayConfig::builder(Url::parse(base).expect("Base URL fixture should parse."))
		.build()
		.expect("Gateway config fixture should build.")
}

/// Signed-token lookalike whose payload carries `exp`.
pub fn jwt(exp: i64) -> String {
	let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"sub":"dev@example.com"}}"#));

	format!("{header}.{payload}.signature")
}

/// Store seeded with an authenticated session for `token`.
pub fn store_with(token: &str) -> MemoryStore {
	MemoryStore::with_state(SessionState::issued(TokenSecret::new(token)))
}

/// Gateway wired to `transport`, a shared memory store, and a recording navigator.
pub fn gateway_with<C>(
	config: GatewayConfig,
	store: &MemoryStore,
	transport: C,
) -> (Gateway<C>, RecordingNavigator)
where
	C: GatewayTransport,
{
	let navigator = RecordingNavigator::default();
	let gateway = Gateway::with_transport(
		config,
		Arc::new(store.clone()),
		Arc::new(navigator.clone()),
		transport,
	);

	(gateway, navigator)
}

/// Polls `condition` until it holds, failing the test after five seconds.
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
	for _ in 0..1_000 {
		if condition() {
			return;
		}

		tokio::time::sleep(StdDuration::from_millis(5)).await;
	}

	panic!("Timed out waiting until {what}.");
}

/// Outcome scripted for the refresh endpoint.
#[derive(Clone, Debug)]
pub enum RefreshScript {
	/// Answer 200 with `{token}` and start accepting it.
	Issue(String),
	/// Answer with the status and an empty body.
	Reject(u16),
}

/// Request observed by [`ScriptedBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seen {
	/// Request path.
	pub path: String,
	/// Bearer token, if one was attached.
	pub bearer: Option<String>,
}

/// In-process backend: accepts exactly one credential, rotates it on refresh, and can hold any
/// path until the test releases it.
pub struct ScriptedBackend {
	accepted: Mutex<String>,
	refresh: RefreshScript,
	holds: Mutex<HashMap<String, Arc<Notify>>>,
	seen: Mutex<Vec<Seen>>,
}
impl ScriptedBackend {
	/// Backend that currently accepts `accepted` and answers refreshes with `refresh`.
	pub fn new(accepted: &str, refresh: RefreshScript) -> Self {
		Self {
			accepted: Mutex::new(accepted.to_owned()),
			refresh,
			holds: Default::default(),
			seen: Default::default(),
		}
	}

	/// Holds the first request to `path` until the returned handle is notified.
	pub fn hold(&self, path: &str) -> Arc<Notify> {
		let notify = Arc::new(Notify::new());

		self.holds.lock().insert(path.to_owned(), notify.clone());

		notify
	}

	/// Every request observed so far.
	pub fn seen(&self) -> Vec<Seen> {
		self.seen.lock().clone()
	}

	/// Requests observed for `path`.
	pub fn seen_at(&self, path: &str) -> Vec<Seen> {
		self.seen.lock().iter().filter(|seen| seen.path == path).cloned().collect()
	}

	async fn answer(&self, request: OutboundRequest) -> ApiResponse {
		let path = request.url.path().to_owned();
		let bearer = request.bearer().map(str::to_owned);

		self.seen.lock().push(Seen { path: path.clone(), bearer: bearer.clone() });

		let hold = self.holds.lock().remove(&path);

		if let Some(hold) = hold {
			hold.notified().await;
		}

		if path == GatewayConfig::DEFAULT_REFRESH_PATH {
			return match &self.refresh {
				RefreshScript::Issue(token) => {
					*self.accepted.lock() = token.clone();

					respond(200, format!(r#"{{"token":"{token}"}}"#))
				},
				RefreshScript::Reject(status) => respond(*status, String::new()),
			};
		}

		if bearer.as_deref() == Some(self.accepted.lock().as_str()) {
			respond(200, format!(r#"{{"path":"{path}"}}"#))
		} else {
			respond(401, r#"{"message":"token expired"}"#.to_owned())
		}
	}
}
impl GatewayTransport for ScriptedBackend {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(async move { Ok::<_, Error>(self.answer(request).await) })
	}
}

fn respond(status: u16, body: String) -> ApiResponse {
	let status = StatusCode::from_u16(status).expect("Scripted status should be valid.");

	ApiResponse::new(status, HeaderMap::new(), body.into_bytes())
}
