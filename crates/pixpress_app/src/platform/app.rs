use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pixpress_core::{update, AppState, CompressionResult, Msg};
use pixpress_engine::{EngineHandle, ImageFile};
use pixpress_logging::pix_error;

use super::cli::Cli;
use super::effects::{to_selected_file, EffectRunner};
use super::logging;
use super::ui::render::render;
use super::ui::terminal::Terminal;

const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    match run_cli(&cli) {
        Ok(outcome) if outcome.result.is_some() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            pix_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: &Cli) -> anyhow::Result<Outcome> {
    let engine = EngineHandle::new(cli.settings()).context("starting compression engine")?;
    let runner = EffectRunner::new(engine, cli.out_dir.clone());
    let mut workflow = Workflow::new(runner, Terminal::new(io::stdout()));
    workflow.run(&cli.files, !cli.no_download)
}

/// What a finished run produced.
#[derive(Debug)]
pub struct Outcome {
    pub result: Option<CompressionResult>,
    pub saved: Option<PathBuf>,
}

/// Owns the workflow state and pumps messages between core, engine and terminal.
pub struct Workflow<W: Write> {
    state: AppState,
    runner: EffectRunner,
    terminal: Terminal<W>,
}

impl<W: Write> Workflow<W> {
    pub fn new(runner: EffectRunner, terminal: Terminal<W>) -> Self {
        Self {
            state: AppState::new(),
            runner,
            terminal,
        }
    }

    /// Select `files`, compress the first one, optionally download the result, tear down.
    pub fn run(&mut self, files: &[PathBuf], download: bool) -> anyhow::Result<Outcome> {
        let selection = files
            .iter()
            .map(|path| {
                ImageFile::from_path(path)
                    .map(to_selected_file)
                    .with_context(|| format!("selecting {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        self.dispatch(Msg::FilesSelected(selection))?;
        self.dispatch(Msg::CompressClicked)?;
        self.wait_until_settled()?;

        let result = self.state.result().cloned();
        if download && result.is_some() {
            self.dispatch(Msg::DownloadClicked)?;
            if let Some(path) = self.runner.last_saved() {
                self.terminal.note(&format!("Saved {}", path.display()))?;
            }
        }
        let saved = self.runner.last_saved().cloned();

        self.dispatch(Msg::Shutdown)?;
        Ok(Outcome { result, saved })
    }

    fn wait_until_settled(&mut self) -> anyhow::Result<()> {
        while self.state.is_busy() {
            let msg = self
                .runner
                .next_msg(POLL_INTERVAL)
                .context("waiting for compression result")?
                .unwrap_or(Msg::Tick);
            self.dispatch(msg)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;

        self.runner.enqueue(effects);
        if was_dirty {
            self.terminal.draw(&render(&view))?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::{EffectRunner, Terminal, Workflow};
    use pixpress_core::Msg;
    use pixpress_engine::{CompressSettings, EngineHandle};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JPEG_BYTES: [u8; 8] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

    fn write_images(dir: &TempDir) -> Vec<PathBuf> {
        [
            ("first.png", b"FIRST-IMAGE".as_slice()),
            ("second.png", b"SECOND-IMAGE".as_slice()),
            ("third.png", b"THIRD-IMAGE".as_slice()),
        ]
        .into_iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        })
        .collect()
    }

    fn workflow(endpoint: String, out_dir: PathBuf) -> Workflow<Vec<u8>> {
        let settings = CompressSettings {
            endpoint,
            ..CompressSettings::default()
        };
        let engine = EngineHandle::new(settings).unwrap();
        Workflow::new(EffectRunner::new(engine, out_dir), Terminal::new(Vec::new()))
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn three_files_selected_only_first_is_compressed_and_downloaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/compress"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(JPEG_BYTES.to_vec(), "image/jpeg"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let files = write_images(&input);
        let endpoint = format!("{}/compress", server.uri());
        let out_dir = output.path().to_path_buf();

        let (outcome, page, live_blobs) = tokio::task::spawn_blocking(move || {
            let mut workflow = workflow(endpoint, out_dir);
            let outcome = workflow.run(&files, true).unwrap();
            assert!(!workflow.state().is_busy());
            assert_eq!(workflow.state().selection().len(), 3);
            let live_blobs = workflow.runner.live_blobs();
            let page = String::from_utf8(workflow.terminal.into_inner()).unwrap();
            (outcome, page, live_blobs)
        })
        .await
        .unwrap();

        let result = outcome.result.expect("result");
        assert_eq!(result.byte_len, JPEG_BYTES.len() as u64);
        assert!(result.url.starts_with("blob:pixpress/"));

        let saved = outcome.saved.expect("download written");
        assert_eq!(saved.file_name().unwrap(), "compressed.jpg");
        assert_eq!(std::fs::read(&saved).unwrap(), JPEG_BYTES.to_vec());

        // Torn down: the result bytes were released.
        assert_eq!(live_blobs, 0);

        assert!(page.contains("[1] first.png"));
        assert!(page.contains("[2] second.png"));
        assert!(page.contains("[3] third.png"));
        assert!(page.contains("Download: compressed.jpg"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body = &requests[0].body;
        assert!(contains(body, b"FIRST-IMAGE"));
        assert!(!contains(body, b"SECOND-IMAGE"));
        assert!(!contains(body, b"THIRD-IMAGE"));
    }

    #[test]
    fn refused_connection_resets_busy_and_logs_once() {
        pixpress_logging::initialize_for_tests();
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let files = write_images(&input);

        pixpress_logging::reset_diagnostics();
        let mut workflow = workflow(
            "http://127.0.0.1:1/compress".to_string(),
            output.path().to_path_buf(),
        );
        let outcome = workflow.run(&files, true).unwrap();

        assert!(outcome.result.is_none());
        assert!(outcome.saved.is_none());
        assert!(!workflow.state().is_busy());
        assert_eq!(pixpress_logging::diagnostic_count(), 1);
        assert!(!output.path().join("compressed.jpg").exists());
    }

    #[test]
    fn missing_file_is_a_setup_error() {
        let output = TempDir::new().unwrap();
        let mut workflow = workflow(
            "http://127.0.0.1:1/compress".to_string(),
            output.path().to_path_buf(),
        );

        let err = workflow
            .run(&[output.path().join("nope.png")], true)
            .unwrap_err();
        assert!(format!("{err:#}").contains("nope.png"));
    }

    #[test]
    fn empty_selection_never_dispatches_a_request() {
        let output = TempDir::new().unwrap();
        let mut workflow = workflow(
            "http://127.0.0.1:1/compress".to_string(),
            output.path().to_path_buf(),
        );

        workflow.dispatch(Msg::FilesSelected(Vec::new())).unwrap();
        workflow.dispatch(Msg::CompressClicked).unwrap();

        assert!(!workflow.state().is_busy());
        assert!(workflow
            .runner
            .next_msg(std::time::Duration::from_millis(100))
            .unwrap()
            .is_none());
    }
}
