use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::client::stream::{PayloadPolicy, StreamConfig, DEFAULT_URL};
use crate::core::renderer::{RendererConfig, DEFAULT_GRID};
use crate::viewer::{ViewerConfig, DEFAULT_CANVAS_SIZE};

pub const LOG_ENV: &str = "GRIDTERM_LOG";

#[derive(Parser, Debug)]
#[command(name = "gridterm")]
#[command(about = "Watch a grid race game live in the terminal")]
#[command(version)]
pub struct Cli {
    /// Event-stream endpoint pushing game snapshots
    #[arg(short, long, env = "GRIDTERM_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Cells per side of the board
    #[arg(short, long, default_value_t = DEFAULT_GRID)]
    pub grid: u32,

    /// Canvas side in pixels; one tile is canvas-size / grid pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_SIZE)]
    pub canvas_size: u32,

    /// Stop on the first malformed snapshot instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Reconnect delay in milliseconds until the server sets one
    #[arg(long, default_value_t = 3000)]
    pub retry_ms: u64,

    /// Give up after this many reconnects (default: never)
    #[arg(long)]
    pub max_reconnects: Option<u32>,

    /// Print the winner line per snapshot instead of drawing the board
    #[arg(long)]
    pub headless: bool,

    /// Write logs here; the interactive board otherwise discards them
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            renderer: RendererConfig { grid: self.grid },
            canvas_size: self.canvas_size,
            stream: StreamConfig {
                url: self.url.clone(),
                payload_policy: if self.strict {
                    PayloadPolicy::FailFast
                } else {
                    PayloadPolicy::Skip
                },
                retry: Duration::from_millis(self.retry_ms),
                max_reconnects: self.max_reconnects,
            },
            headless: self.headless,
        }
    }

    /// Install the tracing subscriber.
    ///
    /// Logs must never reach the terminal while the board is drawn, so the
    /// interactive mode only logs when given a file.
    pub fn init_logging(&self) -> Result<()> {
        let filter = || EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

        match (&self.log_file, self.headless) {
            (Some(path), _) => {
                let file = File::create(path)
                    .with_context(|| format!("cannot open log file {}", path.display()))?;
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            (None, true) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_writer(std::io::stderr)
                    .init();
            }
            (None, false) => {}
        }
        Ok(())
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging()?;
    crate::viewer::run(cli.viewer_config()).await
}
