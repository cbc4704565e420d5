// self
use crate::_prelude::*;

/// Hook invoked when a failed refresh drops the session.
///
/// Hosts route the user to the unauthenticated entry point here; the gateway passes the
/// configured [`login_route`](crate::config::GatewayConfig::login_route). The call is
/// synchronous and must not block.
pub trait SessionNavigator
where
	Self: Send + Sync,
{
	/// Sends the user to `route`.
	fn redirect_to_login(&self, route: &str);
}
impl<F> SessionNavigator for F
where
	F: Send + Sync + Fn(&str),
{
	fn redirect_to_login(&self, route: &str) {
		self(route)
	}
}

/// Navigator that ignores redirects, for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNavigator;
impl SessionNavigator for NoopNavigator {
	fn redirect_to_login(&self, _: &str) {}
}

/// Navigator that records every route it was asked to visit.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator(Arc<Mutex<Vec<String>>>);
impl RecordingNavigator {
	/// Routes recorded so far, oldest first.
	pub fn visits(&self) -> Vec<String> {
		self.0.lock().clone()
	}
}
impl SessionNavigator for RecordingNavigator {
	fn redirect_to_login(&self, route: &str) {
		self.0.lock().push(route.to_owned());
	}
}
