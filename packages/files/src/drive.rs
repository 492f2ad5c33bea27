// ABOUTME: Google Drive attachment store
// ABOUTME: Multipart uploads to the Drive v3 API, delete by file id

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{sanitize_file_name, FileError, FileStore, StorageKind, StoredFile};

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

pub struct DriveFileStore {
    client: reqwest::Client,
    access_token: String,
    folder_id: Option<String>,
}

impl DriveFileStore {
    pub fn new(access_token: String, folder_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            folder_id,
        }
    }

    fn view_url(file_id: &str) -> String {
        format!("https://drive.google.com/file/d/{}/view", file_id)
    }
}

#[async_trait]
impl FileStore for DriveFileStore {
    fn kind(&self) -> StorageKind {
        StorageKind::GoogleDrive
    }

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, FileError> {
        let file_name = sanitize_file_name(file_name);

        let mut metadata = serde_json::json!({ "name": file_name });
        if let Some(folder) = &self.folder_id {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(file_name.clone()),
            );

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FileError::Upload(format!("Drive upload failed ({status}): {body}")));
        }

        let uploaded: DriveFile = response.json().await?;
        debug!("Uploaded attachment to Drive: {}", uploaded.id);

        Ok(StoredFile {
            url: Self::view_url(&uploaded.id),
            file_name,
            external_id: Some(uploaded.id),
            kind: StorageKind::GoogleDrive,
        })
    }

    async fn delete(&self, stored: &StoredFile) -> Result<(), FileError> {
        let Some(file_id) = &stored.external_id else {
            return Err(FileError::Upload("Missing Drive file id".to_string()));
        };

        let response = self
            .client
            .delete(format!("{}/{}", FILES_URL, file_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(FileError::Upload(format!("Drive delete failed ({status})")));
        }

        debug!("Deleted Drive attachment {}", file_id);
        Ok(())
    }
}
