//! Pixpress core: pure upload/compress workflow state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, CompressionResult, InFlight, RequestId, ResultHandle, SelectedFile, Stage,
    DOWNLOAD_FILE_NAME,
};
pub use update::update;
pub use view_model::{AppViewModel, PreviewView, ProgressView, ResultView};
