use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use photodump_logging::{pd_debug, pd_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::{
    decode_results, CategoryResults, ClearScope, FailureKind, RequestError, UploadFile,
    UploadReceipt,
};

pub const ARCHIVE_FILENAME: &str = "images.zip";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub download_dir: PathBuf,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            download_dir: PathBuf::from("."),
        }
    }
}

/// HTTP surface of the categorization server.
///
/// Only the connect phase is bounded; uploads and the start call may take as
/// long as the server needs.
#[async_trait::async_trait]
pub trait ServerApi: Send + Sync {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadReceipt, RequestError>;
    async fn remove_file(&self, filename: &str) -> Result<(), RequestError>;
    async fn list_uploads(&self) -> Result<Vec<String>, RequestError>;
    async fn clear(&self, scope: ClearScope) -> Result<(), RequestError>;
    async fn process(&self, categories: &[String]) -> Result<CategoryResults, RequestError>;
    /// Stream the result archive into the download directory.
    async fn download(&self) -> Result<PathBuf, RequestError>;
    async fn cleanup(&self) -> Result<(), RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, RequestError> {
        let base = normalize_base(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base
            .join(path)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn post_json(&self, path: &str, body: &impl Serialize) -> Result<RequestBuilder, RequestError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
        Ok(self
            .client
            .post(self.endpoint(path)?)
            .header(CONTENT_TYPE, "application/json")
            .body(payload))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl ServerApi for ReqwestApi {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadReceipt, RequestError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.data)
                .file_name(file.name)
                .mime_str(&file.content_type)
                .map_err(|err| RequestError::new(FailureKind::InvalidInput, err.to_string()))?;
            form = form.part("files", part);
        }
        let request = self.client.post(self.endpoint("upload")?).multipart(form);
        let response = self.send(request).await?;
        read_json(response).await
    }

    async fn remove_file(&self, filename: &str) -> Result<(), RequestError> {
        #[derive(Serialize)]
        struct RemoveBody<'a> {
            filename: &'a str,
        }
        let request = self.post_json("remove-file", &RemoveBody { filename })?;
        self.send(request).await?;
        Ok(())
    }

    async fn list_uploads(&self) -> Result<Vec<String>, RequestError> {
        let request = self.client.get(self.endpoint("list-uploads")?);
        let response = self.send(request).await?;
        read_json(response).await
    }

    async fn clear(&self, scope: ClearScope) -> Result<(), RequestError> {
        let request = self.client.post(self.endpoint(scope.endpoint())?);
        self.send(request).await?;
        Ok(())
    }

    async fn process(&self, categories: &[String]) -> Result<CategoryResults, RequestError> {
        let request = self.post_json("process", &categories)?;
        let response = self.send(request).await?;
        let value: Value = read_json(response).await?;
        decode_results(value)
    }

    async fn download(&self) -> Result<PathBuf, RequestError> {
        let request = self.client.get(self.endpoint("download")?);
        let response = self.send(request).await?;

        let writer = AtomicFileWriter::new(self.settings.download_dir.clone());
        let mut pending = writer.begin(ARCHIVE_FILENAME).map_err(map_persist_error)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            written += chunk.len() as u64;
            pending.append(&chunk).map_err(map_persist_error)?;
        }
        let path = pending.commit().map_err(map_persist_error)?;
        pd_debug!("Downloaded {} bytes to {:?}", written, path);
        Ok(path)
    }

    async fn cleanup(&self) -> Result<(), RequestError> {
        let request = self.client.post(self.endpoint("cleanup")?);
        self.send(request).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| {
        pd_warn!("Undecodable response body ({} bytes): {}", body.len(), err);
        RequestError::new(FailureKind::Decode, err.to_string())
    })
}

/// Parse the base URL and make sure relative joins stay under its path.
fn normalize_base(raw: &str) -> Result<Url, RequestError> {
    let mut base = Url::parse(raw.trim())
        .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(RequestError::new(
            FailureKind::InvalidUrl,
            format!("unsupported scheme {}", base.scheme()),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    RequestError::new(FailureKind::Network, err.to_string())
}

fn map_persist_error(err: PersistError) -> RequestError {
    RequestError::new(FailureKind::Io, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_base;
    use crate::FailureKind;

    #[test]
    fn base_path_gets_trailing_slash() {
        let base = normalize_base("http://host:8000/photodump").unwrap();
        assert_eq!(
            base.join("upload").unwrap().as_str(),
            "http://host:8000/photodump/upload"
        );
        let root = normalize_base("http://host:8000").unwrap();
        assert_eq!(root.join("clear").unwrap().as_str(), "http://host:8000/clear");
    }

    #[test]
    fn non_http_base_is_rejected() {
        let err = normalize_base("ftp://host").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
        assert!(normalize_base("not a url").is_err());
    }
}
