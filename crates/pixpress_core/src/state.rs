use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::view_model::{AppViewModel, PreviewView, ProgressView, ResultView};

pub type RequestId = u64;

/// Name offered for every download, whatever format the service returned.
pub const DOWNLOAD_FILE_NAME: &str = "compressed.jpg";

/// Opaque reference to result bytes held outside the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultHandle(pub u64);

/// A file handle from one picking action. Contents are read only on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub handle: ResultHandle,
    /// Locally addressable form of `handle`, usable as an image source.
    pub url: String,
    pub byte_len: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Reading,
    Uploading,
    Receiving,
}

/// The one request whose response may still settle the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlight {
    pub request_id: RequestId,
    pub stage: Option<Stage>,
    pub bytes: Option<u64>,
}

/// Whole workflow state. Busy exactly when `in_flight` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    selection: Vec<SelectedFile>,
    result: Option<CompressionResult>,
    in_flight: Option<InFlight>,
    last_request_id: RequestId,
    #[serde(skip)]
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &[SelectedFile] {
        &self.selection
    }

    pub fn result(&self) -> Option<&CompressionResult> {
        self.result.as_ref()
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn view(&self) -> AppViewModel {
        let previews = self
            .selection
            .iter()
            .enumerate()
            .map(|(index, file)| PreviewView {
                index,
                name: file.name.clone(),
                size: file.size,
                content_type: file.content_type.clone(),
            })
            .collect();

        let progress = self.in_flight.as_ref().map(|job| ProgressView {
            request_id: job.request_id,
            stage: job.stage,
            bytes: job.bytes,
        });

        let result = self.result.as_ref().map(|result| ResultView {
            handle: result.handle,
            url: result.url.clone(),
            byte_len: result.byte_len,
            content_type: result.content_type.clone(),
            download_name: DOWNLOAD_FILE_NAME.to_string(),
        });

        AppViewModel {
            previews,
            submit_enabled: !self.is_busy() && !self.selection.is_empty(),
            busy: self.is_busy(),
            progress,
            result,
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn replace_selection(&mut self, files: Vec<SelectedFile>) {
        self.selection = files;
        self.dirty = true;
    }

    /// Starts a request for the first selected file.
    ///
    /// Returns the new id, the file to send, and the id of the request it
    /// supersedes. `None` when nothing is selected.
    pub(crate) fn begin_request(
        &mut self,
    ) -> Option<(RequestId, SelectedFile, Option<RequestId>)> {
        let file = self.selection.first()?.clone();
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        let superseded = self
            .in_flight
            .replace(InFlight {
                request_id,
                stage: None,
                bytes: None,
            })
            .map(|previous| previous.request_id);
        self.dirty = true;
        Some((request_id, file, superseded))
    }

    pub(crate) fn is_outstanding(&self, request_id: RequestId) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|job| job.request_id == request_id)
    }

    pub(crate) fn apply_progress(
        &mut self,
        request_id: RequestId,
        stage: Stage,
        bytes: Option<u64>,
    ) {
        if let Some(job) = self
            .in_flight
            .as_mut()
            .filter(|job| job.request_id == request_id)
        {
            job.stage = Some(stage);
            if bytes.is_some() {
                job.bytes = bytes;
            }
            self.dirty = true;
        }
    }

    /// Settles the outstanding request with `result`, returning the result it replaces.
    pub(crate) fn accept_result(
        &mut self,
        result: CompressionResult,
    ) -> Option<CompressionResult> {
        self.in_flight = None;
        self.dirty = true;
        self.result.replace(result)
    }

    /// Settles the outstanding request without touching the current result.
    pub(crate) fn settle_failed(&mut self) {
        self.in_flight = None;
        self.dirty = true;
    }

    /// Drops the in-flight request and the current result, handing both back for cleanup.
    pub(crate) fn tear_down(&mut self) -> (Option<RequestId>, Option<CompressionResult>) {
        let in_flight = self.in_flight.take().map(|job| job.request_id);
        let result = self.result.take();
        if in_flight.is_some() || result.is_some() {
            self.dirty = true;
        }
        (in_flight, result)
    }
}
