//! Outbound response construction and delivery.
//!
//! A [`Response`] is built incrementally from a tag, a [`Code`] and a
//! sequence of arguments, and packed into a single protocol line (sans
//! newline). Arguments are escaped on the way in, so callers always pass
//! raw, unescaped strings.

use std::fmt;

/// Identifier of a connected client within the I/O layer.
///
/// IDs are assigned monotonically from 1; they are never reused within a
/// single server run.
pub type ClientId = usize;

/// The tag used on responses that answer no particular request: state
/// broadcasts, position ticks, and the welcome sequence.
pub const NOREQUEST: &str = "!";

/// Every response code playd can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Server greeting, sent once per connection.
    Ohai,
    /// Role announcement (`player/file`), sent once per connection.
    Iama,
    /// A file has been loaded.
    Fload,
    /// No file is loaded.
    Eject,
    /// Position update, in microseconds.
    Pos,
    /// The loaded file reached its end.
    End,
    /// Playback started.
    Play,
    /// Playback stopped.
    Stop,
    /// Total length of the loaded file, in microseconds.
    Len,
    /// Terminal result of one command.
    Ack,
    /// End-of-dump marker.
    Dump,
}

impl Code {
    /// The on-wire spelling of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Code::Ohai => "OHAI",
            Code::Iama => "IAMA",
            Code::Fload => "FLOAD",
            Code::Eject => "EJECT",
            Code::Pos => "POS",
            Code::End => "END",
            Code::Play => "PLAY",
            Code::Stop => "STOP",
            Code::Len => "LEN",
            Code::Ack => "ACK",
            Code::Dump => "DUMP",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status word of an ACK response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// The command succeeded.
    Ok,
    /// The client sent something nonsensical (bad argument, wrong state).
    What,
    /// The environment failed the command (codec, I/O, device).
    Fail,
}

impl Ack {
    /// The on-wire spelling of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Ack::Ok => "OK",
            Ack::What => "WHAT",
            Ack::Fail => "FAIL",
        }
    }
}

/// A single outbound protocol line.
///
/// The line is packed eagerly as arguments are added; [`Response::pack`]
/// is therefore free and may be called repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    line: String,
}

impl Response {
    /// Starts a response with the given tag and code.
    pub fn new(tag: &str, code: Code) -> Self {
        let mut line = escape_arg(tag);
        line.push(' ');
        line.push_str(code.as_str());
        Response { line }
    }

    /// Starts an unsolicited response, tagged [`NOREQUEST`].
    pub fn unsolicited(code: Code) -> Self {
        Response::new(NOREQUEST, code)
    }

    /// Builds the `ACK OK Success` terminal response for a command.
    pub fn success(tag: &str) -> Self {
        Response::ack(tag, Ack::Ok, "Success")
    }

    /// Builds an `ACK WHAT` terminal response: the client asked for
    /// something that doesn't make sense right now.
    pub fn invalid(tag: &str, message: &str) -> Self {
        Response::ack(tag, Ack::What, message)
    }

    /// Builds an `ACK FAIL` terminal response: the command was
    /// reasonable, but the environment failed it.
    pub fn failure(tag: &str, message: &str) -> Self {
        Response::ack(tag, Ack::Fail, message)
    }

    /// Builds an arbitrary ACK.
    pub fn ack(tag: &str, status: Ack, message: &str) -> Self {
        Response::new(tag, Code::Ack)
            .arg(status.as_str())
            .arg(message)
    }

    /// Appends an argument, escaping it as needed. Consumes and returns
    /// `self` so calls can be chained.
    pub fn arg(mut self, arg: &str) -> Self {
        self.line.push(' ');
        self.line.push_str(&escape_arg(arg));
        self
    }

    /// The packed protocol line, without a trailing newline.
    pub fn pack(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Escapes one argument for emission.
///
/// Arguments containing whitespace, quotes or backslashes are wrapped in
/// single quotes; embedded single quotes become `'\''` (leave quotes,
/// emit an escaped quote, re-enter quotes). Anything else is passed
/// through verbatim, since quoting it would waste two bytes per word.
fn escape_arg(arg: &str) -> String {
    let mut escaping = false;
    let mut escaped = String::with_capacity(arg.len());

    for c in arg.chars() {
        if c.is_ascii_whitespace() || c == '"' || c == '\'' || c == '\\' {
            escaping = true;
        }
        if c == '\'' {
            escaped.push_str(r"'\''");
        } else {
            escaped.push(c);
        }
    }

    if escaping {
        format!("'{escaped}'")
    } else {
        escaped
    }
}

/// Where a response should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every connected client.
    Broadcast,
    /// One specific client.
    Client(ClientId),
}

/// Anything that can deliver responses to clients.
///
/// The player emits through this trait and never touches sockets; the
/// I/O layer provides the real implementation, and tests substitute a
/// recording one.
pub trait ResponseSink {
    /// Queues one response for delivery.
    fn respond(&self, target: Target, response: Response);
}
