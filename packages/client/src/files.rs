//! File transfer: multipart upload and chunked streaming download.
//!
//! Files are opaque blobs keyed by a client-generated identifier; the data
//! model is not involved. Uploads send a multipart form (`file` part plus
//! the identifier and ticket), downloads stream the body chunk by chunk so
//! large files never have to fit a single read.

use std::path::Path;

use reqwest::multipart;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::TapestryClient;
use crate::error::{ClientError, Result};

impl TapestryClient {
    /// Upload a file, returning the platform identifier it was stored
    /// under. The identifier is generated client-side (UUIDv4) and sent
    /// alongside the binary part, mirroring how the platform's own web
    /// client names uploads.
    pub async fn upload_file(&self, content: Vec<u8>, filename: &str) -> Result<String> {
        let ticket = self.require_ticket()?;
        let file_id = format!("file_{}", Uuid::new_v4().simple());

        let form = multipart::Form::new()
            .text("ticket", ticket.to_string())
            .text("uri", file_id.clone())
            .part(
                "file",
                multipart::Part::bytes(content).file_name(filename.to_string()),
            );

        debug!("upload_file: {filename} as {file_id}");
        let response = self
            .http
            .put(self.endpoint("files"))
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ClientError::from_status(status));
        }
        Ok(file_id)
    }

    /// Download a file into memory by its platform identifier.
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let ticket = self.require_ticket()?;
        let mut response = self
            .http
            .get(format!("{}/{}", self.endpoint("files"), file_id))
            .query(&[("ticket", ticket)])
            .send()
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ClientError::from_status(status));
        }

        let mut content = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            content.extend_from_slice(&chunk);
        }
        Ok(content)
    }

    /// Download a file to a local path, converting *any* failure into
    /// `false`.
    ///
    /// Like [`is_ticket_valid`](Self::is_ticket_valid), this swallowing
    /// behaviour is an intentional API asymmetry kept for compatibility;
    /// the failure is logged, not raised. Use
    /// [`download_file`](Self::download_file) when the cause matters.
    pub async fn download_file_to(&self, file_id: &str, path: &Path) -> bool {
        match self.stream_to_path(file_id, path).await {
            Ok(()) => true,
            Err(e) => {
                warn!("download of {file_id} to {} failed: {e}", path.display());
                false
            }
        }
    }

    async fn stream_to_path(&self, file_id: &str, path: &Path) -> Result<()> {
        let ticket = self.require_ticket()?;
        let mut response = self
            .http
            .get(format!("{}/{}", self.endpoint("files"), file_id))
            .query(&[("ticket", ticket)])
            .send()
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ClientError::from_status(status));
        }

        let mut file = tokio::fs::File::create(path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
