//! Pixpress engine: IO side of the workflow and effect execution.
mod blob;
mod compress;
mod engine;
mod file;
mod persist;
mod types;

pub use blob::{BlobHandle, BlobStore};
pub use compress::{
    CompressSettings, Compressor, ProgressSink, ReqwestCompressor, DEFAULT_ENDPOINT,
    DEFAULT_MAX_RESPONSE_BYTES, FORM_FIELD, PROGRESS_STEP,
};
pub use engine::{EngineError, EngineHandle};
pub use file::ImageFile;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    CompressError, CompressedImage, CompressedPayload, EngineEvent, FailureKind, Progress,
    RequestId, Stage,
};
