//! Image uploads.

use crate::request::FilePart;
use crate::{FetchClient, FetchError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where an uploaded file can be fetched from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub url: String,
}

/// Typed access to `/uploads`.
pub struct UploadsApi<'a> {
    client: &'a FetchClient,
}

impl<'a> UploadsApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self { client }
    }

    /// Upload one file as the `file` field of a multipart form.
    pub async fn upload(
        &self,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, FetchError> {
        let part = FilePart {
            field: "file".to_string(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        };
        let size = part.bytes.len();
        let uploaded: UploadedFile = self.client.post("uploads").multipart(part).send_record().await?;
        info!(url = %uploaded.url, size, "file uploaded");
        Ok(uploaded)
    }
}
