use pixpress_core::{AppViewModel, PreviewView, ProgressView, ResultView, Stage};

/// One element of the terminal page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Heading(String),
    Preview { index: usize, text: String },
    SubmitButton { label: String, enabled: bool },
    ResultPreview { url: String, text: String },
    DownloadLink { file_name: String, url: String },
}

pub fn render(view: &AppViewModel) -> Vec<UiCommand> {
    let mut cmds = Vec::new();

    if !view.previews.is_empty() {
        cmds.push(UiCommand::Heading("Selected Images".to_string()));
        cmds.extend(view.previews.iter().map(|preview| UiCommand::Preview {
            index: preview.index,
            text: format_preview(preview),
        }));
        let label = if view.busy {
            busy_label(view.progress.as_ref())
        } else {
            "Compress".to_string()
        };
        cmds.push(UiCommand::SubmitButton {
            label,
            enabled: view.submit_enabled,
        });
    }

    if let Some(result) = &view.result {
        cmds.push(UiCommand::Heading("Compressed".to_string()));
        cmds.push(UiCommand::ResultPreview {
            url: result.url.clone(),
            text: format_result(result),
        });
        cmds.push(UiCommand::DownloadLink {
            file_name: result.download_name.clone(),
            url: result.url.clone(),
        });
    }

    cmds
}

fn format_preview(preview: &PreviewView) -> String {
    match &preview.content_type {
        Some(ct) => format!(
            "{} ({} B, {})",
            preview.name,
            format_with_commas(preview.size),
            ct
        ),
        None => format!("{} ({} B)", preview.name, format_with_commas(preview.size)),
    }
}

fn format_result(result: &ResultView) -> String {
    let kind = result.content_type.as_deref().unwrap_or("unknown type");
    format!("{} B, {}", format_with_commas(result.byte_len), kind)
}

fn busy_label(progress: Option<&ProgressView>) -> String {
    let stage = progress.and_then(|p| p.stage);
    let bytes = progress.and_then(|p| p.bytes);
    match (stage, bytes) {
        (Some(stage), Some(bytes)) => format!(
            "Compressing... {} {} B",
            stage_label(stage),
            format_with_commas(bytes)
        ),
        (Some(stage), None) => format!("Compressing... {}", stage_label(stage)),
        (None, _) => "Compressing...".to_string(),
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Reading => "reading",
        Stage::Uploading => "uploading",
        Stage::Receiving => "receiving",
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
