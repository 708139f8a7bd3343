use std::path::PathBuf;
use std::time::Duration;

use pixpress_core::{CompressionResult, Effect, Msg, ResultHandle, SelectedFile, Stage};
use pixpress_engine::{
    AtomicFileWriter, BlobHandle, EngineError, EngineEvent, EngineHandle, ImageFile,
};
use pixpress_logging::{pix_error, pix_info, pix_warn};

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    writer: AtomicFileWriter,
    last_saved: Option<PathBuf>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, out_dir: PathBuf) -> Self {
        Self {
            engine,
            writer: AtomicFileWriter::new(out_dir),
            last_saved: None,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitImage { request_id, file } => {
                    pix_info!(
                        "SubmitImage request_id={} name={} size={}",
                        request_id,
                        file.name,
                        file.size
                    );
                    self.engine.submit(request_id, to_image_file(file));
                }
                Effect::CancelRequest { request_id } => {
                    if self.engine.cancel(request_id) {
                        pix_info!("Cancelled request {}", request_id);
                    }
                }
                Effect::ReleaseResult { handle } => {
                    self.engine.blobs().revoke(to_blob(handle));
                }
                Effect::SaveResult { handle, file_name } => self.save(handle, &file_name),
                Effect::ReportFailure { request_id, error } => {
                    pix_error!("Compression failed for request {}: {}", request_id, error);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineError> {
        Ok(self.engine.recv_timeout(timeout)?.map(map_event))
    }

    pub fn last_saved(&self) -> Option<&PathBuf> {
        self.last_saved.as_ref()
    }

    #[cfg(test)]
    pub fn live_blobs(&self) -> usize {
        self.engine.blobs().len()
    }

    fn save(&mut self, handle: ResultHandle, file_name: &str) {
        let Some(bytes) = self.engine.blobs().get(to_blob(handle)) else {
            pix_warn!("Result {:?} is no longer available for download", handle);
            return;
        };
        match self.writer.write(file_name, &bytes) {
            Ok(path) => {
                pix_info!("Saved {} bytes to {:?}", bytes.len(), path);
                self.last_saved = Some(path);
            }
            Err(err) => pix_error!("Failed to save {}: {}", file_name, err),
        }
    }
}

fn to_image_file(file: SelectedFile) -> ImageFile {
    ImageFile {
        path: file.path,
        name: file.name,
        content_type: file.content_type,
        size: file.size,
    }
}

pub fn to_selected_file(file: ImageFile) -> SelectedFile {
    SelectedFile {
        path: file.path,
        name: file.name,
        content_type: file.content_type,
        size: file.size,
    }
}

fn to_blob(handle: ResultHandle) -> BlobHandle {
    BlobHandle(handle.0)
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => Msg::CompressionProgress {
            request_id: progress.request_id,
            stage: map_stage(progress.stage),
            bytes: progress.bytes,
        },
        EngineEvent::Completed { request_id, result } => match result {
            Ok(image) => Msg::CompressionSucceeded {
                request_id,
                result: CompressionResult {
                    handle: ResultHandle(image.handle.0),
                    url: image.handle.url(),
                    byte_len: image.byte_len,
                    content_type: image.content_type,
                },
            },
            Err(err) => Msg::CompressionFailed {
                request_id,
                error: err.to_string(),
            },
        },
    }
}

fn map_stage(stage: pixpress_engine::Stage) -> Stage {
    match stage {
        pixpress_engine::Stage::Reading => Stage::Reading,
        pixpress_engine::Stage::Uploading => Stage::Uploading,
        pixpress_engine::Stage::Receiving => Stage::Receiving,
    }
}
