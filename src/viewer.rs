//! Wires the event-stream client to the renderer and the terminal.
//!
//! The client runs as its own task and forwards snapshots over a bounded
//! channel; the render loop owns the canvas and the winner text and redraws
//! once per snapshot, in arrival order.

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::stream::{EventStreamClient, StreamConfig, StreamStatus};
use crate::core::canvas::PixelCanvas;
use crate::core::error::StreamError;
use crate::core::renderer::{Renderer, RendererConfig};
use crate::core::state::GameState;
use crate::core::surface::{StatusText, TextElement};
use crate::core::terminal::draw_screen;

pub const DEFAULT_CANVAS_SIZE: u32 = 60;
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub renderer: RendererConfig,
    /// Canvas side in pixels
    pub canvas_size: u32,
    pub stream: StreamConfig,
    pub headless: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            canvas_size: DEFAULT_CANVAS_SIZE,
            stream: StreamConfig::default(),
            headless: false,
        }
    }
}

/// Render state shared by both front-ends
pub struct Viewer {
    renderer: Renderer<PixelCanvas, StatusText>,
    leaderboard: Vec<(String, i64)>,
    connection: String,
    frames: u64,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        let canvas = PixelCanvas::new(config.canvas_size, config.canvas_size);
        let renderer = Renderer::new(canvas, StatusText::new(), &config.renderer)
            .context("cannot set up the board")?;
        Ok(Self {
            renderer,
            leaderboard: Vec::new(),
            connection: StreamStatus::default().to_string(),
            frames: 0,
        })
    }

    /// Handle one snapshot from the stream
    pub fn apply(&mut self, state: &GameState) {
        self.renderer.render(state);
        self.leaderboard = state.leaderboard();
        self.frames += 1;
    }

    pub fn canvas(&self) -> &PixelCanvas {
        self.renderer.surface()
    }

    pub fn winner_text(&self) -> &str {
        self.renderer.text().text_content()
    }

    pub fn leaderboard(&self) -> &[(String, i64)] {
        &self.leaderboard
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Footer text describing the stream connection
    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn set_status(&mut self, status: &StreamStatus) {
        self.connection = status.to_string();
    }

    fn draw(&self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            draw_screen(
                frame,
                self.canvas(),
                self.winner_text(),
                self.leaderboard(),
                self.connection(),
            )
        })?;
        Ok(())
    }
}

/// The running stream client as seen by the render loop
pub struct StreamHandle {
    pub snapshots: mpsc::Receiver<GameState>,
    pub status: watch::Receiver<StreamStatus>,
    pub task: JoinHandle<Result<(), StreamError>>,
}

/// Start the stream client on its own task
pub fn spawn_stream(config: StreamConfig) -> StreamHandle {
    let (tx, snapshots) = mpsc::channel(CHANNEL_CAPACITY);
    let mut client = EventStreamClient::new(config);
    let status = client.status();
    let task = tokio::spawn(async move { client.run(tx).await });
    StreamHandle { snapshots, status, task }
}

pub async fn run(config: ViewerConfig) -> Result<()> {
    let viewer = Viewer::new(&config)?;
    let StreamHandle {
        snapshots,
        status,
        task: stream_task,
    } = spawn_stream(config.stream.clone());
    info!(url = %config.stream.url, headless = config.headless, "viewer starting");

    if config.headless {
        run_headless(viewer, snapshots, stream_task).await
    } else {
        let mut terminal = ratatui::try_init().context("cannot set up the terminal")?;
        let result = run_interactive(viewer, snapshots, status, &mut terminal).await;
        ratatui::restore();
        match result {
            Ok(StopReason::Quit) => {
                stream_task.abort();
                Ok(())
            }
            Ok(StopReason::StreamEnded) => join_stream(stream_task).await,
            Err(e) => {
                stream_task.abort();
                Err(e)
            }
        }
    }
}

/// Render every snapshot and print the winner line; ends when the stream does
pub async fn run_headless(
    mut viewer: Viewer,
    mut rx: mpsc::Receiver<GameState>,
    stream_task: JoinHandle<Result<(), StreamError>>,
) -> Result<()> {
    while let Some(state) = rx.recv().await {
        viewer.apply(&state);
        info!(frame = viewer.frames(), status = %viewer.winner_text(), "snapshot rendered");
        println!("{}", viewer.winner_text());
    }
    join_stream(stream_task).await
}

async fn join_stream(stream_task: JoinHandle<Result<(), StreamError>>) -> Result<()> {
    stream_task
        .await
        .context("stream task panicked")?
        .context("event stream failed")
}

enum StopReason {
    Quit,
    StreamEnded,
}

async fn run_interactive(
    mut viewer: Viewer,
    mut rx: mpsc::Receiver<GameState>,
    mut status: watch::Receiver<StreamStatus>,
    terminal: &mut DefaultTerminal,
) -> Result<StopReason> {
    let mut keys = EventStream::new();
    let mut status_open = true;
    viewer.set_status(&status.borrow_and_update());
    viewer.draw(terminal)?;

    loop {
        tokio::select! {
            snapshot = rx.recv() => match snapshot {
                Some(state) => {
                    viewer.apply(&state);
                    viewer.draw(terminal)?;
                }
                None => return Ok(StopReason::StreamEnded),
            },
            changed = status.changed(), if status_open => match changed {
                Ok(()) => {
                    viewer.set_status(&status.borrow_and_update());
                    viewer.draw(terminal)?;
                }
                Err(_) => status_open = false,
            },
            event = keys.next() => match event {
                Some(Ok(Event::Key(key))) if is_quit(&key) => {
                    debug!("quit requested");
                    return Ok(StopReason::Quit);
                }
                Some(Ok(Event::Resize(..))) => viewer.draw(terminal)?,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("reading terminal events"),
                None => return Ok(StopReason::Quit),
            },
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
