#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked files; replaces the whole selection.
    FilesSelected(Vec<crate::SelectedFile>),
    /// User clicked the compress button.
    CompressClicked,
    /// Engine progress for a request.
    CompressionProgress {
        request_id: crate::RequestId,
        stage: crate::Stage,
        bytes: Option<u64>,
    },
    /// Engine delivered a compressed image.
    CompressionSucceeded {
        request_id: crate::RequestId,
        result: crate::CompressionResult,
    },
    /// Engine gave up on a request.
    CompressionFailed {
        request_id: crate::RequestId,
        error: String,
    },
    /// User clicked Download.
    DownloadClicked,
    /// Workflow is being torn down; release everything it holds.
    Shutdown,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
