use std::path::PathBuf;

use pixpress_core::{update, AppState, CompressionResult, Msg, ResultHandle, SelectedFile};

#[test]
fn state_record_survives_json() {
    let files = vec![SelectedFile {
        path: PathBuf::from("/pictures/cat.png"),
        name: "cat.png".to_string(),
        content_type: Some("image/png".to_string()),
        size: 2048,
    }];
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files));
    let (state, _) = update(state, Msg::CompressClicked);
    let (mut state, _) = update(
        state,
        Msg::CompressionSucceeded {
            request_id: 1,
            result: CompressionResult {
                handle: ResultHandle(1),
                url: "blob:pixpress/1".to_string(),
                byte_len: 3,
                content_type: None,
            },
        },
    );
    state.consume_dirty();

    let json = serde_json::to_string(&state).expect("serialize");
    let restored: AppState = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, state);
    assert!(!restored.is_busy());

    // Request ids keep counting after a restore.
    let (restored, _) = update(restored, Msg::CompressClicked);
    assert_eq!(restored.in_flight().map(|job| job.request_id), Some(2));
}
