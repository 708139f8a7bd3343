use crate::{RequestId, ResultHandle, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub previews: Vec<PreviewView>,
    pub submit_enabled: bool,
    pub busy: bool,
    pub progress: Option<ProgressView>,
    pub result: Option<ResultView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub request_id: RequestId,
    pub stage: Option<Stage>,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub handle: ResultHandle,
    pub url: String,
    pub byte_len: u64,
    pub content_type: Option<String>,
    pub download_name: String,
}
