//! Constant human-readable messages used within playd.

/// Greeting sent to every new client.
pub const MSG_OHAI: &str = concat!("playd ", env!("CARGO_PKG_VERSION"));

/// Sent when a command has fewer than a tag and a verb.
pub const MSG_CMD_SHORT: &str = "Command must contain at least a tag and a verb";

/// Sent when the verb or its arity is unknown.
pub const MSG_CMD_INVALID: &str = "Bad command or file name";

/// Sent when a command that needs a loaded file runs with none loaded.
pub const MSG_CMD_NEEDS_LOADED: &str = "Command requires a loaded file";

/// Sent to commands that arrive after quit.
pub const MSG_PLAYER_CLOSING: &str = "Player is closing";

/// Sent when one tries to load an empty path.
pub const MSG_LOAD_EMPTY_PATH: &str = "Empty file path given";

/// Sent when a seek command has an unparseable position.
pub const MSG_SEEK_INVALID_VALUE: &str = "Invalid time: try a non-negative number of microseconds";
