//! Typed request builders for the release changelog and approval endpoints.
//!
//! [`ConsoleApi`] is a thin facade: each method builds an [`ApiRequest`], sends it through
//! [`Gateway::send`], and decodes the body into the caller's type. Record shapes belong to the
//! backend, so every method is generic over the payload and response types.

pub mod upload;

pub use upload::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::{ApiRequest, ApiResponse, GatewayTransport},
};

/// Console endpoints bound to a gateway.
pub struct ConsoleApi<'a, C>
where
	C: ?Sized + GatewayTransport,
{
	gateway: &'a Gateway<C>,
}
impl<'a, C> ConsoleApi<'a, C>
where
	C: ?Sized + GatewayTransport,
{
	const APPROVALS: &'static str = "/v1/approvals";
	const ENTRIES: &'static str = "/entries";
	const MODULES: &'static str = "/modules";
	const RELEASES: &'static str = "/releases";
	const USERS: &'static str = "/users";

	/// Binds the endpoints to `gateway`.
	pub fn new(gateway: &'a Gateway<C>) -> Self {
		Self { gateway }
	}

	/// `GET /releases` with the provided query pairs.
	pub async fn list_releases<T>(&self, query: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(with_query(ApiRequest::get(Self::RELEASES), query)).await
	}

	/// `GET /releases/{id}`.
	pub async fn release<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::get(item(Self::RELEASES, id))).await
	}

	/// `POST /releases` with a JSON body.
	pub async fn create_release<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::post(Self::RELEASES).json(body)?).await
	}

	/// `POST /releases` with firmware files attached as `files[]`.
	pub async fn upload_release<T>(&self, form: UploadForm) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::post(Self::RELEASES).multipart(form.into_multipart(FileField::Files)))
			.await
	}

	/// `PUT /releases/{id}` with a JSON body.
	pub async fn update_release<B, T>(&self, id: impl Display, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::put(item(Self::RELEASES, id)).json(body)?).await
	}

	/// `PUT /releases/{id}` with firmware files attached as `files[]`.
	pub async fn upload_release_update<T>(&self, id: impl Display, form: UploadForm) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = ApiRequest::put(item(Self::RELEASES, id))
			.multipart(form.into_multipart(FileField::Files));

		self.fetch(request).await
	}

	/// `DELETE /releases/{id}`.
	pub async fn delete_release(&self, id: impl Display) -> Result<ApiResponse> {
		self.gateway.send(ApiRequest::delete(item(Self::RELEASES, id))).await
	}

	/// `PUT /modules/{id}`.
	pub async fn update_module<B, T>(&self, id: impl Display, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::put(item(Self::MODULES, id)).json(body)?).await
	}

	/// `DELETE /modules/{id}`.
	pub async fn delete_module(&self, id: impl Display) -> Result<ApiResponse> {
		self.gateway.send(ApiRequest::delete(item(Self::MODULES, id))).await
	}

	/// `PUT /entries/{id}`.
	pub async fn update_entry<B, T>(&self, id: impl Display, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::put(item(Self::ENTRIES, id)).json(body)?).await
	}

	/// `DELETE /entries/{id}`.
	pub async fn delete_entry(&self, id: impl Display) -> Result<ApiResponse> {
		self.gateway.send(ApiRequest::delete(item(Self::ENTRIES, id))).await
	}

	/// `GET /v1/approvals` with the provided query pairs.
	pub async fn list_approvals<T>(&self, query: &[(&str, &str)]) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(with_query(ApiRequest::get(Self::APPROVALS), query)).await
	}

	/// `GET /v1/approvals/{id}`.
	pub async fn approval<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::get(item(Self::APPROVALS, id))).await
	}

	/// `POST /v1/approvals` with the attachment sent as `file`.
	pub async fn create_approval<T>(&self, form: UploadForm) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::post(Self::APPROVALS).multipart(form.into_multipart(FileField::File)))
			.await
	}

	/// `PUT /v1/approvals/{id}` with the attachment sent as `file`.
	pub async fn update_approval<T>(&self, id: impl Display, form: UploadForm) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = ApiRequest::put(item(Self::APPROVALS, id))
			.multipart(form.into_multipart(FileField::File));

		self.fetch(request).await
	}

	/// `DELETE /v1/approvals/{id}`.
	pub async fn delete_approval(&self, id: impl Display) -> Result<ApiResponse> {
		self.gateway.send(ApiRequest::delete(item(Self::APPROVALS, id))).await
	}

	/// `POST /users`.
	pub async fn register_user<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::post(Self::USERS).json(body)?).await
	}

	async fn fetch<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.gateway.send(request).await?.json()
	}
}
impl<C> Clone for ConsoleApi<'_, C>
where
	C: ?Sized + GatewayTransport,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<C> Copy for ConsoleApi<'_, C> where C: ?Sized + GatewayTransport {}
impl<C> Debug for ConsoleApi<'_, C>
where
	C: ?Sized + GatewayTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConsoleApi").field("gateway", self.gateway).finish()
	}
}

fn item(collection: &str, id: impl Display) -> String {
	format!("{collection}/{id}")
}

fn with_query(request: ApiRequest, query: &[(&str, &str)]) -> ApiRequest {
	query.iter().fold(request, |request, (key, value)| request.query(*key, *value))
}
