use thiserror::Error;

/// Errors surfaced by the HUD renderer and its host loop.
///
/// Configuration inconsistencies (a roll arc that does not fit, for example)
/// are not errors: the affected element is skipped for the frame.
#[derive(Debug, Error)]
pub enum HudError {
    /// The configured font bytes could not be parsed.
    #[error("failed to load font ({len} bytes)")]
    FontLoad { len: usize },

    /// Text could not be laid out or rasterized.
    #[error("failed to render text {text:?}: {reason}")]
    Text { text: String, reason: String },

    /// The pixel buffer could not be created or presented.
    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),

    /// The pixel buffer could not be resized.
    #[error("pixel buffer resize failed: {0}")]
    Texture(#[from] pixels::TextureError),

    /// The window could not be created.
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop failed to start or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// A flight-state feed line could not be parsed.
    #[error("invalid flight command {line:?}: {reason}")]
    Parse { line: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HudError>;
