use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pixpress_engine::{CompressSettings, DEFAULT_ENDPOINT, DEFAULT_MAX_RESPONSE_BYTES};

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "pixpress",
    version,
    about = "Send an image to the compression service and save what comes back"
)]
pub struct Cli {
    /// Files to select. Only the first one is sent.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Compression service endpoint.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Directory the download is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Give up on the service after this many seconds. Waits forever when unset.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Reject service responses larger than this many bytes (default 50 MiB).
    #[arg(long, default_value_t = DEFAULT_MAX_RESPONSE_BYTES)]
    pub max_response_bytes: u64,
    /// Show the result without saving it.
    #[arg(long)]
    pub no_download: bool,
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,
    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn settings(&self) -> CompressSettings {
        CompressSettings {
            endpoint: self.endpoint.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            max_response_bytes: self.max_response_bytes,
            ..CompressSettings::default()
        }
    }
}
