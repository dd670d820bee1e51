/// Event-stream client: pulls snapshots from the server and hands them to the viewer
use std::fmt;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Url;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::client::sse::{SseDecoder, DEFAULT_EVENT_TYPE};
use crate::core::error::StreamError;
use crate::core::state::GameState;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8080/stream";
pub const DEFAULT_RETRY: Duration = Duration::from_millis(3000);

const LAST_EVENT_ID: &str = "Last-Event-ID";

/// What to do with a message that is not a valid snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadPolicy {
    /// Log it and keep listening
    #[default]
    Skip,
    /// Stop the client with [`StreamError::Payload`]
    FailFast,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub url: String,
    pub payload_policy: PayloadPolicy,
    /// Delay before reconnecting until the server sends `retry:`
    pub retry: Duration,
    /// `None` reconnects forever
    pub max_reconnects: Option<u32>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            payload_policy: PayloadPolicy::default(),
            retry: DEFAULT_RETRY,
            max_reconnects: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connection {
    #[default]
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Stopped,
}

/// Connection state and the most recent problem, for display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamStatus {
    pub connection: Connection,
    pub last_error: Option<String>,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connection {
            Connection::Connecting => f.write_str("connecting")?,
            Connection::Connected => f.write_str("connected")?,
            Connection::Reconnecting { attempt } => write!(f, "reconnecting (attempt {attempt})")?,
            Connection::Stopped => f.write_str("stopped")?,
        }
        if let Some(error) = &self.last_error {
            write!(f, " | last error: {error}")?;
        }
        Ok(())
    }
}

/// Only plain HTTP(S) URLs can carry an event stream
pub fn parse_url(url: &str) -> Result<Url, StreamError> {
    let parsed = Url::parse(url).map_err(|e| StreamError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(StreamError::UnsupportedScheme(other.to_string())),
    }
}

/// How a single connection ended
enum Disconnect {
    /// Server closed the body or the transport broke; worth retrying
    Dropped,
    /// Nobody is listening for snapshots any more
    ReceiverGone,
}

pub struct EventStreamClient {
    config: StreamConfig,
    http: reqwest::Client,
    decoder: SseDecoder,
    status: watch::Sender<StreamStatus>,
}

impl EventStreamClient {
    pub fn new(config: StreamConfig) -> Self {
        let (status, _) = watch::channel(StreamStatus::default());
        Self {
            config,
            http: reqwest::Client::new(),
            decoder: SseDecoder::new(),
            status,
        }
    }

    /// Follow connection changes and the last error seen
    pub fn status(&self) -> watch::Receiver<StreamStatus> {
        self.status.subscribe()
    }

    fn set_connection(&self, connection: Connection) {
        self.status.send_modify(|s| s.connection = connection);
    }

    fn report_error(&self, error: impl fmt::Display) {
        let message = error.to_string();
        self.status.send_modify(|s| s.last_error = Some(message));
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Current reconnection delay, as last announced by the server
    pub fn retry_delay(&self) -> Duration {
        self.decoder.retry().unwrap_or(self.config.retry)
    }

    /// Stream snapshots into `sender` until the receiver goes away or the
    /// connection fails for good.
    ///
    /// Dropped connections are retried after the retry delay, resuming with
    /// `Last-Event-ID`. A bad URL, status or content type is not retried.
    pub async fn run(&mut self, sender: mpsc::Sender<GameState>) -> Result<(), StreamError> {
        let result = self.run_until_stopped(&sender).await;
        if let Err(e) = &result {
            self.report_error(e);
        }
        self.set_connection(Connection::Stopped);
        result
    }

    async fn run_until_stopped(&mut self, sender: &mpsc::Sender<GameState>) -> Result<(), StreamError> {
        let url = parse_url(&self.config.url)?;
        let mut reconnects: u32 = 0;
        loop {
            match self.connect_once(&url, sender).await {
                Ok(Disconnect::ReceiverGone) => {
                    debug!("snapshot receiver closed, stopping stream");
                    return Ok(());
                }
                Ok(Disconnect::Dropped) => info!(%url, "stream closed by server"),
                Err(StreamError::Http(e)) => {
                    warn!(%url, error = %e, "stream connection failed");
                    self.report_error(e);
                }
                Err(fatal) => return Err(fatal),
            }

            if let Some(max) = self.config.max_reconnects {
                if reconnects >= max {
                    return Err(StreamError::ReconnectsExhausted(max));
                }
            }
            reconnects += 1;
            self.set_connection(Connection::Reconnecting { attempt: reconnects });

            let delay = self.retry_delay();
            info!(attempt = reconnects, delay_ms = delay.as_millis() as u64, "reconnecting");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = sender.closed() => return Ok(()),
            }
        }
    }

    async fn connect_once(&mut self, url: &Url, sender: &mpsc::Sender<GameState>) -> Result<Disconnect, StreamError> {
        self.decoder.reset();

        let mut request = self
            .http
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        let last_id = self.decoder.last_event_id();
        if !last_id.is_empty() {
            match HeaderValue::from_str(last_id) {
                Ok(value) => request = request.header(LAST_EVENT_ID, value),
                Err(_) => warn!(id = ?last_id, "event id is not a valid header value, resuming without it"),
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_event_stream(&content_type) {
            return Err(StreamError::ContentType(content_type));
        }
        info!(%url, "stream connected");
        self.set_connection(Connection::Connected);

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "stream interrupted");
                    self.report_error(e);
                    return Ok(Disconnect::Dropped);
                }
            };
            for event in self.decoder.push(&chunk) {
                if event.event_type != DEFAULT_EVENT_TYPE {
                    debug!(event_type = %event.event_type, "ignoring non-message event");
                    continue;
                }
                let state = match GameState::from_json(&event.data) {
                    Ok(state) => state,
                    Err(e) => match self.config.payload_policy {
                        PayloadPolicy::Skip => {
                            warn!(error = %e, id = %event.id, "skipping malformed snapshot");
                            self.report_error(format_args!("skipped malformed snapshot: {e}"));
                            continue;
                        }
                        PayloadPolicy::FailFast => return Err(StreamError::Payload(e)),
                    },
                };
                if sender.send(state).await.is_err() {
                    return Ok(Disconnect::ReceiverGone);
                }
            }
        }
        Ok(Disconnect::Dropped)
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("text/event-stream"))
        .unwrap_or(false)
}
