//! Wire-protocol primitives for the playd audio server.
//!
//! playd speaks a line-oriented text protocol over TCP. This crate holds
//! the pieces of that protocol that are independent of both the network
//! transport and the audio pipeline:
//!
//! - [`Response`] and [`Code`]: outbound message construction, including
//!   POSIX-shell-style argument quoting
//! - [`ResponseSink`]: the delivery interface the player emits through
//! - [`Tokenizer`]: the streaming request tokeniser (resumable across
//!   partial TCP reads)
//!
//! Requests are `<tag> <verb> [arg ...]`, where the tag is an opaque
//! client-chosen token echoed back in the terminal ACK. Responses are
//! either unsolicited broadcasts (tagged [`NOREQUEST`]) or ACKs carrying
//! the request tag.

#![warn(missing_docs)]

mod response;
mod tokenizer;

pub use response::{Ack, ClientId, Code, Response, ResponseSink, Target, NOREQUEST};
pub use tokenizer::Tokenizer;
