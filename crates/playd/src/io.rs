//! The TCP I/O core: a single-threaded poll loop that owns the
//! listener, the client connections, and the player update timer.
//!
//! Everything here runs on the main thread. Each tick (~5 ms) accepts
//! new clients, reads whatever bytes have arrived, dispatches complete
//! command lines into the player, runs one player update, and flushes
//! queued responses out to the sockets. The ring buffer inside the
//! audio pipeline absorbs the jitter of this cadence.
//!
//! The player never touches sockets: it emits into a [`ChannelSink`],
//! and the loop drains the channel after each batch of work. Using one
//! queue for broadcasts, per-client dumps and ACKs keeps the emission
//! order on the wire identical to the order the player produced.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::time::Duration;

use playd_audio::Result;
use playd_protocol::{ClientId, Response, ResponseSink, Target, Tokenizer};

use crate::player::Player;

/// Period between player update ticks.
const UPDATE_PERIOD: Duration = Duration::from_millis(5);

/// A [`ResponseSink`] backed by an in-process queue.
pub struct ChannelSink {
    tx: mpsc::Sender<(Target, Response)>,
}

impl ChannelSink {
    /// Wraps one end of the response queue. The I/O loop keeps its own
    /// clone of the sender so ACKs join the same ordered stream.
    pub fn new(tx: mpsc::Sender<(Target, Response)>) -> Self {
        ChannelSink { tx }
    }
}

impl ResponseSink for ChannelSink {
    fn respond(&self, target: Target, response: Response) {
        // The receiver lives as long as the loop; a send can only fail
        // during teardown, when nobody is listening anyway.
        let _ = self.tx.send((target, response));
    }
}

/// One connected client.
struct Connection {
    id: ClientId,
    stream: TcpStream,
    tokenizer: Tokenizer,
    open: bool,
}

impl Connection {
    /// Writes one response line. Any write failure closes the
    /// connection; a client that can't drain its socket at these data
    /// rates is gone or wedged.
    fn write_line(&mut self, response: &Response) {
        if !self.open {
            return;
        }

        let mut line = Vec::with_capacity(response.pack().len() + 1);
        line.extend_from_slice(response.pack().as_bytes());
        line.push(b'\n');

        if let Err(e) = self.stream.write_all(&line) {
            log::warn!("dropping client {}: write failed: {e}", self.id);
            self.open = false;
        }
    }
}

/// The server's reactor: listener, connection pool, and update timer.
pub struct IoCore {
    listener: TcpListener,
    connections: Vec<Connection>,
    next_id: ClientId,
    tx: mpsc::Sender<(Target, Response)>,
    rx: mpsc::Receiver<(Target, Response)>,
}

impl IoCore {
    /// Binds the listening socket. The player's [`ChannelSink`] ends
    /// are passed in so ACKs can be queued behind the broadcasts each
    /// command produced.
    pub fn bind(
        host: &str,
        port: u16,
        tx: mpsc::Sender<(Target, Response)>,
        rx: mpsc::Receiver<(Target, Response)>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind((host, port))?;
        listener.set_nonblocking(true)?;
        log::info!("listening on {host}:{port}");

        Ok(IoCore {
            listener,
            connections: Vec::new(),
            next_id: 1,
            tx,
            rx,
        })
    }

    /// Runs the main loop until the player stops running.
    ///
    /// # Errors
    ///
    /// Only internal pipeline errors escape; they are bugs and abort
    /// the server.
    pub fn run(&mut self, player: &mut Player) -> Result<()> {
        loop {
            self.accept_clients(player);
            self.read_clients(player);

            let running = player.update()?;

            self.flush_responses();
            self.connections.retain(|conn| conn.open);

            if !running {
                log::info!("player finished; shutting down");
                return Ok(());
            }

            std::thread::sleep(UPDATE_PERIOD);
        }
    }

    /// Accepts every pending connection and welcomes it.
    fn accept_clients(&mut self, player: &mut Player) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(true) {
                        log::warn!("rejecting client from {addr}: {e}");
                        continue;
                    }

                    let id = self.next_id;
                    self.next_id += 1;
                    log::info!("client {id} connected from {addr}");

                    self.connections.push(Connection {
                        id,
                        stream,
                        tokenizer: Tokenizer::new(),
                        open: true,
                    });
                    player.welcome_client(id);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    log::warn!("accept failed: {e}");
                    break;
                }
            }
        }
    }

    /// Drains readable bytes from every client and dispatches the
    /// complete command lines they form.
    fn read_clients(&mut self, player: &mut Player) {
        let mut buf = [0u8; 4096];

        for conn in &mut self.connections {
            while conn.open {
                match conn.stream.read(&mut buf) {
                    Ok(0) => {
                        log::info!("client {} disconnected", conn.id);
                        conn.open = false;
                    }
                    Ok(n) => {
                        for words in conn.tokenizer.feed(&buf[..n]) {
                            if words.is_empty() {
                                continue;
                            }
                            log::debug!("client {}: {words:?}", conn.id);

                            let ack = player.run_command(&words, conn.id);
                            // Queue the ACK behind whatever the command
                            // broadcast, preserving wire order.
                            let _ = self.tx.send((Target::Client(conn.id), ack));
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                    Err(e) => {
                        log::warn!("dropping client {}: read failed: {e}", conn.id);
                        conn.open = false;
                    }
                }
            }
        }
    }

    /// Delivers everything the player queued since the last flush.
    fn flush_responses(&mut self) {
        while let Ok((target, response)) = self.rx.try_recv() {
            match target {
                Target::Broadcast => {
                    for conn in &mut self.connections {
                        conn.write_line(&response);
                    }
                }
                Target::Client(id) => {
                    if let Some(conn) = self.connections.iter_mut().find(|c| c.id == id) {
                        conn.write_line(&response);
                    }
                }
            }
        }
    }
}
