//! Error types for the rendering and streaming layers.

/// A CSS color string the raster canvas cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("unrecognized color: {0:?}")]
    Unrecognized(String),
}

/// Errors raised while setting up a renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The grid does not fit on the surface (zero cells, or less than a pixel per cell).
    #[error("invalid geometry: {grid}x{grid} grid on a {width}px wide surface")]
    InvalidGeometry { grid: u32, width: u32 },
}

/// Errors that end the event-stream client.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Transport-level failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured URL cannot be parsed.
    #[error("invalid stream URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The URL uses a scheme other than `http` or `https`.
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),

    /// The server answered with something other than 2xx.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// The server answered without a `text/event-stream` body.
    #[error("unexpected content type {0:?}")]
    ContentType(String),

    /// A message payload was not a valid snapshot and the policy is fail-fast.
    #[error("malformed snapshot: {0}")]
    Payload(#[from] serde_json::Error),

    /// Gave up after the configured number of reconnects.
    #[error("gave up after {0} reconnect attempts")]
    ReconnectsExhausted(u32),
}
