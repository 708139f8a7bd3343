use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use pixpress_logging::{pix_debug, pix_trace};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::compress::ChannelProgressSink;
use crate::{
    BlobStore, CompressError, CompressSettings, CompressedImage, Compressor, EngineEvent,
    FailureKind, ImageFile, ReqwestCompressor, RequestId,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("could not build http client: {0}")]
    Client(#[from] CompressError),
    #[error("engine worker stopped")]
    Disconnected,
}

enum EngineCommand {
    Submit {
        request_id: RequestId,
        file: ImageFile,
        token: CancellationToken,
    },
}

type CancelTable = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs compression requests on a background tokio runtime.
///
/// Results come back through `try_recv`/`recv_timeout`; successful payloads
/// are already registered in `blobs()` when their event is delivered.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    blobs: BlobStore,
    cancels: CancelTable,
}

impl EngineHandle {
    pub fn new(settings: CompressSettings) -> Result<Self, EngineError> {
        let compressor = ReqwestCompressor::new(settings)?;
        Self::with_compressor(Arc::new(compressor))
    }

    pub fn with_compressor(compressor: Arc<dyn Compressor>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let blobs = BlobStore::new();
        let cancels: CancelTable = Arc::default();
        let runtime = tokio::runtime::Runtime::new()?;

        let worker_blobs = blobs.clone();
        let worker_cancels = cancels.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let compressor = compressor.clone();
                let event_tx = event_tx.clone();
                let blobs = worker_blobs.clone();
                let cancels = worker_cancels.clone();
                runtime.spawn(async move {
                    handle_command(compressor.as_ref(), command, event_tx, &blobs, &cancels)
                        .await;
                });
            }
            pix_trace!("engine command channel closed");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            blobs,
            cancels,
        })
    }

    pub fn submit(&self, request_id: RequestId, file: ImageFile) {
        let token = CancellationToken::new();
        lock(&self.cancels).insert(request_id, token.clone());
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            request_id,
            file,
            token,
        });
    }

    /// Aborts a request. It still completes, with `FailureKind::Cancelled`.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        match lock(&self.cancels).remove(&request_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// `Ok(None)` when nothing arrived in time; `Disconnected` once the worker is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }
}

fn lock(
    cancels: &CancelTable,
) -> std::sync::MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
    cancels.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn handle_command(
    compressor: &dyn Compressor,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    blobs: &BlobStore,
    cancels: &CancelTable,
) {
    match command {
        EngineCommand::Submit {
            request_id,
            file,
            token,
        } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let outcome = tokio::select! {
                outcome = compressor.compress(request_id, &file, &sink) => outcome,
                () = token.cancelled() => Err(CompressError::new(
                    FailureKind::Cancelled,
                    "request cancelled",
                )),
            };
            lock(cancels).remove(&request_id);

            let result = outcome.map(|payload| CompressedImage {
                byte_len: payload.bytes.len() as u64,
                handle: blobs.insert(payload.bytes),
                content_type: payload.content_type,
            });
            match &result {
                Ok(image) => pix_debug!(
                    "request {} stored {} bytes as {}",
                    request_id,
                    image.byte_len,
                    image.handle
                ),
                Err(err) => pix_debug!("request {} ended: {}", request_id, err),
            }
            let _ = event_tx.send(EngineEvent::Completed { request_id, result });
        }
    }
}
