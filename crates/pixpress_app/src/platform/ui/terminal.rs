use std::io::{self, Write};

use super::render::UiCommand;

/// Prints rendered pages to a writer, one frame per call.
pub struct Terminal<W: Write> {
    out: W,
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn draw(&mut self, cmds: &[UiCommand]) -> io::Result<()> {
        writeln!(self.out, "----")?;
        for cmd in cmds {
            match cmd {
                UiCommand::Heading(text) => writeln!(self.out, "{text}")?,
                UiCommand::Preview { index, text } => {
                    writeln!(self.out, "  [{}] {}", index + 1, text)?
                }
                UiCommand::SubmitButton { label, enabled } => {
                    let state = if *enabled { "" } else { " (disabled)" };
                    writeln!(self.out, "  <{label}>{state}")?
                }
                UiCommand::ResultPreview { url, text } => {
                    writeln!(self.out, "  {url} ({text})")?
                }
                UiCommand::DownloadLink { file_name, .. } => {
                    writeln!(self.out, "  Download: {file_name}")?
                }
            }
        }
        self.out.flush()
    }

    pub fn note(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
