use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::{
    CompressError, CompressedPayload, EngineEvent, FailureKind, ImageFile, Progress, RequestId,
    Stage,
};

/// Where the compression service listens unless told otherwise.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/compress";
/// Multipart field the service reads the upload from.
pub const FORM_FIELD: &str = "image";
/// Largest response body accepted unless configured otherwise (50 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 50 * 1024 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";
/// Received bytes between two `Receiving` progress events.
pub const PROGRESS_STEP: u64 = 64 * 1024;

#[derive(Debug, Clone)]
pub struct CompressSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Whole-request deadline. `None` waits for as long as the service takes.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
    pub user_agent: String,
}

impl Default for CompressSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: concat!("pixpress/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(
        &self,
        request_id: RequestId,
        file: &ImageFile,
        sink: &dyn ProgressSink,
    ) -> Result<CompressedPayload, CompressError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestCompressor {
    settings: CompressSettings,
    client: reqwest::Client,
}

impl ReqwestCompressor {
    pub fn new(settings: CompressSettings) -> Result<Self, CompressError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| CompressError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &CompressSettings {
        &self.settings
    }
}

fn progress(sink: &dyn ProgressSink, request_id: RequestId, stage: Stage, bytes: Option<u64>) {
    sink.emit(EngineEvent::Progress(Progress {
        request_id,
        stage,
        bytes,
    }));
}

#[async_trait::async_trait]
impl Compressor for ReqwestCompressor {
    async fn compress(
        &self,
        request_id: RequestId,
        file: &ImageFile,
        sink: &dyn ProgressSink,
    ) -> Result<CompressedPayload, CompressError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| CompressError::new(FailureKind::InvalidEndpoint, err.to_string()))?;

        progress(sink, request_id, Stage::Reading, None);
        let data = tokio::fs::read(&file.path).await.map_err(|err| {
            CompressError::new(
                FailureKind::ReadFile,
                format!("{}: {err}", file.path.display()),
            )
        })?;
        let upload_len = data.len() as u64;

        let part = Part::bytes(data)
            .file_name(file.name.clone())
            .mime_str(file.content_type.as_deref().unwrap_or(OCTET_STREAM))
            .map_err(|err| CompressError::new(FailureKind::ReadFile, err.to_string()))?;
        let form = Form::new().part(FORM_FIELD, part);

        progress(sink, request_id, Stage::Uploading, Some(upload_len));
        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompressError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(CompressError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        // Any content type is accepted and the body, even an empty one, is opaque image bytes.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        progress(sink, request_id, Stage::Receiving, Some(0));
        let mut bytes = Vec::new();
        let mut reported = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(CompressError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
            if next_len - reported >= PROGRESS_STEP {
                progress(sink, request_id, Stage::Receiving, Some(next_len));
                reported = next_len;
            }
        }

        if reported != bytes.len() as u64 {
            progress(sink, request_id, Stage::Receiving, Some(bytes.len() as u64));
        }

        Ok(CompressedPayload {
            bytes: bytes.into(),
            content_type,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CompressError {
    if err.is_timeout() {
        return CompressError::new(FailureKind::Timeout, err.to_string());
    }
    CompressError::new(FailureKind::Network, err.to_string())
}
