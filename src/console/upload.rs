//! Multipart contract used by release and approval submissions.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::ConfigError, http::MultipartForm};

/// Field name carrying uploaded files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileField {
	/// Repeated `files[]` parts (release uploads).
	Files,
	/// `file` parts (approval attachments).
	File,
}
impl FileField {
	/// Multipart field name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Files => "files[]",
			Self::File => "file",
		}
	}
}

/// File attached to an [`UploadForm`].
#[derive(Clone)]
pub struct UploadFile {
	/// File name reported to the backend.
	pub file_name: String,
	/// Optional MIME type.
	pub content_type: Option<String>,
	/// File contents.
	pub bytes: Vec<u8>,
}
impl Debug for UploadFile {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UploadFile")
			.field("file_name", &self.file_name)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}

/// File-bearing submission: JSON metadata, a target directory, files, and firmware links.
///
/// Links are kept as `(module, description)` pairs and emitted as the parallel
/// `linkModule[]` / `linkDescription[]` arrays, so the two never drift out of step.
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
	data: Option<Value>,
	dir: Option<String>,
	files: Vec<UploadFile>,
	links: Vec<(String, String)>,
}
impl UploadForm {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self::default()
	}

	/// Serializes `data` as the `data` field.
	pub fn data<T>(mut self, data: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.data = Some(serde_json::to_value(data)?);

		Ok(self)
	}

	/// Sets the target directory sent as `dir`.
	pub fn dir(mut self, dir: impl Into<String>) -> Self {
		self.dir = Some(dir.into());

		self
	}

	/// Attaches a file.
	pub fn file(
		mut self,
		file_name: impl Into<String>,
		content_type: Option<String>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		self.files.push(UploadFile {
			file_name: file_name.into(),
			content_type,
			bytes: bytes.into(),
		});

		self
	}

	/// Adds a firmware link for `module`.
	pub fn link(mut self, module: impl Into<String>, description: impl Into<String>) -> Self {
		self.links.push((module.into(), description.into()));

		self
	}

	/// Files attached so far.
	pub fn files(&self) -> &[UploadFile] {
		&self.files
	}

	/// Builds the multipart payload, naming file parts after `field`.
	///
	/// Parts are emitted in a fixed order: `data`, `dir`, files, then link pairs.
	pub fn into_multipart(self, field: FileField) -> MultipartForm {
		let Self { data, dir, files, links } = self;
		let mut form = MultipartForm::default();

		if let Some(data) = data {
			form = form.text("data", data.to_string());
		}
		if let Some(dir) = dir {
			form = form.text("dir", dir);
		}

		for UploadFile { file_name, content_type, bytes } in files {
			form = form.file(field.as_str(), file_name, content_type, bytes);
		}
		for (module, description) in links {
			form = form.text("linkModule[]", module).text("linkDescription[]", description);
		}

		form
	}
}
