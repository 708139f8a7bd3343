use crate::{AppState, Effect, Msg, DOWNLOAD_FILE_NAME};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => {
            state.replace_selection(files);
            Vec::new()
        }
        Msg::CompressClicked => match state.begin_request() {
            // Only the first selected file is ever sent.
            Some((request_id, file, superseded)) => {
                let mut effects = Vec::with_capacity(2);
                if let Some(old) = superseded {
                    effects.push(Effect::CancelRequest { request_id: old });
                }
                effects.push(Effect::SubmitImage { request_id, file });
                effects
            }
            None => Vec::new(),
        },
        Msg::CompressionProgress {
            request_id,
            stage,
            bytes,
        } => {
            state.apply_progress(request_id, stage, bytes);
            Vec::new()
        }
        Msg::CompressionSucceeded { request_id, result } => {
            if state.is_outstanding(request_id) {
                match state.accept_result(result) {
                    Some(previous) => vec![Effect::ReleaseResult {
                        handle: previous.handle,
                    }],
                    None => Vec::new(),
                }
            } else {
                // Stale: a newer request owns the workflow, or it was torn down.
                vec![Effect::ReleaseResult {
                    handle: result.handle,
                }]
            }
        }
        Msg::CompressionFailed { request_id, error } => {
            if state.is_outstanding(request_id) {
                state.settle_failed();
                vec![Effect::ReportFailure { request_id, error }]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadClicked => match state.result() {
            Some(result) => vec![Effect::SaveResult {
                handle: result.handle,
                file_name: DOWNLOAD_FILE_NAME.to_string(),
            }],
            None => Vec::new(),
        },
        Msg::Shutdown => {
            let (in_flight, result) = state.tear_down();
            let mut effects = Vec::new();
            if let Some(request_id) = in_flight {
                effects.push(Effect::CancelRequest { request_id });
            }
            if let Some(result) = result {
                effects.push(Effect::ReleaseResult {
                    handle: result.handle,
                });
            }
            effects
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
