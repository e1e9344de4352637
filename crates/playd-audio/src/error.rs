//! Error types for the audio pipeline.

/// Error type for audio pipeline operations.
///
/// The variants map one-to-one onto the dispositions the player applies:
/// configuration errors are fatal at startup, file errors eject and fail
/// the command, seek errors are treated as running off the end of the
/// file, internal errors indicate a bug, and [`AudioError::NoAudio`]
/// means the command needed a loaded file.
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    /// The requested device does not exist or cannot be opened.
    #[error("configuration error: {0}")]
    Config(String),

    /// The file cannot be opened, probed, or decoded.
    #[error("{0}")]
    File(String),

    /// A seek was out of range or refused by the decoder.
    #[error("seek failed: {0}")]
    Seek(String),

    /// An invariant was violated. Always a bug, never a runtime
    /// condition.
    #[error("internal error: {0}")]
    Internal(String),

    /// The command requires a loaded file and none is loaded.
    #[error("Command requires a loaded file")]
    NoAudio,

    /// IO error from the filesystem.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio pipeline operations.
pub type Result<T> = std::result::Result<T, AudioError>;
