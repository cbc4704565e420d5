//! Logs in against a mock console backend, lets the credential expire, and shows the gateway
//! refreshing it once while three requests replay transparently.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use console_gateway::{
	auth::LoginRequest,
	config::GatewayConfig,
	console::{ConsoleApi, UploadForm},
	gateway::{Gateway, RecordingNavigator, SessionNavigator},
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200).header("content-type", "application/json").body("{\"token\":\"T1\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body("{\"token\":\"T2\"}");
		})
		.await;

	for path in ["/releases", "/v1/approvals", "/releases/5"] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(path).header("authorization", "Bearer T1");
				then.status(401);
			})
			.await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(path).header("authorization", "Bearer T2");
				then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
			})
			.await;
	}

	let upload = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/approvals").header("authorization", "Bearer T2");
			then.status(201).header("content-type", "application/json").body("{\"id\":42}");
		})
		.await;
	let config = GatewayConfig::builder(Url::parse(&server.base_url())?).build()?;
	let store = Arc::new(MemoryStore::default());
	let navigator = RecordingNavigator::default();
	let gateway = Gateway::new(
		config,
		store.clone() as Arc<dyn SessionStore>,
		Arc::new(navigator.clone()) as Arc<dyn SessionNavigator>,
	)?;

	gateway.login(&LoginRequest::new("dev@example.com", "hunter2")).await?;

	let api = ConsoleApi::new(&gateway);
	let (releases, approvals, release) = tokio::join!(
		api.list_releases::<serde_json::Value>(&[("page", "1")]),
		api.list_approvals::<serde_json::Value>(&[]),
		api.release::<serde_json::Value>(5),
	);

	println!("Releases: {}.", releases?);
	println!("Approvals: {}.", approvals?);
	println!("Release 5: {}.", release?);

	let created: serde_json::Value = api
		.create_approval(
			UploadForm::new()
				.data(&serde_json::json!({ "product": "gateway-x", "country": "BR" }))?
				.dir("approvals/gateway-x")
				.file("certificate.pdf", Some("application/pdf".into()), b"%PDF-1.7".to_vec()),
		)
		.await?;

	println!("Created approval: {created}.");
	println!("Refresh calls issued: {}.", gateway.refresh_metrics().attempts());
	println!("Redirects: {:?}.", navigator.visits());

	login.assert_async().await;
	refresh.assert_calls_async(1).await;
	upload.assert_async().await;

	Ok(())
}
