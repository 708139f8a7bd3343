use crate::{RequestId, ResultHandle, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST `file` to the compression service, tagged with `request_id`.
    SubmitImage {
        request_id: RequestId,
        file: SelectedFile,
    },
    /// Abort an in-flight request whose response is no longer wanted.
    CancelRequest { request_id: RequestId },
    /// Free the bytes behind a result handle.
    ReleaseResult { handle: ResultHandle },
    /// Save the result behind `handle` as `file_name`.
    SaveResult {
        handle: ResultHandle,
        file_name: String,
    },
    /// Write a failed submission to the operator log.
    ReportFailure {
        request_id: RequestId,
        error: String,
    },
}
