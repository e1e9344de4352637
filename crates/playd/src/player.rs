//! The player: command dispatch, the load/play/stop/seek/eject state
//! machine, and the broadcasts that keep clients in sync.
//!
//! The player owns exactly one audio object at all times: a null one
//! while ejected, or a live pipeline while a file is loaded. Commands
//! dispatch through it, and errors coming back pick the client-visible
//! disposition: `NoAudio` is a client mistake (WHAT), seek failures are
//! treated as running off the end of the file, file errors eject and
//! FAIL, and internal errors propagate out of the main loop.

use playd_audio::{Audio, AudioError, AudioState, AudioSystem, Result};
use playd_protocol::{ClientId, Code, Response, ResponseSink, Target, NOREQUEST};

use crate::messages;
use crate::position::PositionTracker;

/// The playd player: one loaded file and a command API around it.
pub struct Player {
    system: Box<dyn AudioSystem>,
    file: Box<dyn Audio>,
    sink: Box<dyn ResponseSink>,
    position: PositionTracker,
    running: bool,
}

impl Player {
    /// Creates an ejected player that loads through `system` and emits
    /// through `sink`, announcing positions at most once per
    /// `position_period` microseconds.
    pub fn new(
        system: Box<dyn AudioSystem>,
        sink: Box<dyn ResponseSink>,
        position_period: u64,
    ) -> Self {
        let file = system.null();
        Player {
            system,
            file,
            sink,
            position: PositionTracker::new(position_period),
            running: true,
        }
    }

    /// Performs one cycle of work: drives the pipeline, announces the
    /// position while playing, and handles end-of-file. Returns whether
    /// the player wants to keep running.
    ///
    /// # Errors
    ///
    /// Only internal errors propagate; they indicate a bug and abort
    /// the main loop. Decode failures mid-playback eject the file
    /// instead.
    pub fn update(&mut self) -> Result<bool> {
        match self.file.update() {
            Ok(AudioState::AtEnd) => {
                self.end(NOREQUEST);
            }
            Ok(AudioState::Playing) => {
                // The position advances underneath us while playing;
                // announce it, at a civilised rate.
                if let Ok(pos) = self.file.position() {
                    if self.position.ready(pos) {
                        self.broadcast(Response::unsolicited(Code::Pos).arg(&pos.to_string()));
                    }
                }
            }
            Ok(AudioState::Stopped | AudioState::Ejected) => {}
            Err(e @ AudioError::Internal(_)) => return Err(e),
            Err(e) => {
                log::error!("ejecting after pipeline failure: {e}");
                self.eject_inner();
            }
        }

        Ok(self.running)
    }

    /// Sends the welcome sequence to a newly connected client: the
    /// greeting, the role announcement, and a full state dump.
    pub fn welcome_client(&self, id: ClientId) {
        let target = Target::Client(id);
        self.send(
            target,
            Response::unsolicited(Code::Ohai)
                .arg(&id.to_string())
                .arg(messages::MSG_OHAI),
        );
        self.send(target, Response::unsolicited(Code::Iama).arg("player/file"));
        self.dump_to(target);
        self.send(target, Response::success(NOREQUEST));
    }

    /// Runs one tokenised command line from client `id`, returning the
    /// terminal ACK to deliver to that client.
    pub fn run_command(&mut self, words: &[String], id: ClientId) -> Response {
        if words.is_empty() {
            return Response::invalid(NOREQUEST, messages::MSG_CMD_SHORT);
        }
        let tag = &words[0];
        if words.len() < 2 {
            return Response::invalid(tag, messages::MSG_CMD_SHORT);
        }

        if !self.running {
            // Refuse everything once quitting; this keeps the state
            // machine from being poked during shutdown.
            return Response::failure(tag, messages::MSG_PLAYER_CLOSING);
        }

        let verb = words[1].as_str();
        let nargs = words.len() - 2;

        match (verb, nargs) {
            ("play", 0) => self.set_playing(tag, true),
            ("stop", 0) => self.set_playing(tag, false),
            ("end", 0) => self.end(tag),
            ("eject", 0) => self.eject(tag),
            ("quit", 0) => self.quit(tag),
            ("dump", 0) => self.dump(id, tag),
            ("load", 1) => self.load(tag, &words[2]),
            ("pos", 1) => self.pos(tag, &words[2]),
            _ => Response::invalid(tag, messages::MSG_CMD_INVALID),
        }
    }

    //
    // Commands
    //

    fn set_playing(&mut self, tag: &str, playing: bool) -> Response {
        match self.file.set_playing(playing) {
            Ok(()) => {}
            Err(AudioError::NoAudio) => {
                return Response::invalid(tag, messages::MSG_CMD_NEEDS_LOADED)
            }
            Err(e) => return Response::failure(tag, &e.to_string()),
        }

        self.dump_state(Target::Broadcast);
        Response::success(tag)
    }

    fn load(&mut self, tag: &str, path: &str) -> Response {
        if path.is_empty() {
            return Response::invalid(tag, messages::MSG_LOAD_EMPTY_PATH);
        }

        // Bin the current file before opening the new one, so two
        // pipelines never contend for the device.
        self.file = self.system.null();
        self.position.reset();

        match self.system.load(path) {
            Ok(file) => {
                log::info!("loaded '{path}'");
                self.file = file;
                self.dump_raw(Target::Broadcast, false);
                Response::success(tag)
            }
            Err(e) => {
                // A failed load leaves the player ejected.
                log::warn!("couldn't load '{path}': {e}");
                self.dump_state(Target::Broadcast);
                Response::failure(tag, &e.to_string())
            }
        }
    }

    fn eject(&mut self, tag: &str) -> Response {
        self.eject_inner();
        Response::success(tag)
    }

    fn quit(&mut self, tag: &str) -> Response {
        self.eject_inner();
        self.running = false;
        Response::success(tag)
    }

    fn pos(&mut self, tag: &str, arg: &str) -> Response {
        let micros = match parse_pos(arg) {
            Some(micros) => micros,
            None => return Response::invalid(tag, messages::MSG_SEEK_INVALID_VALUE),
        };

        match self.pos_raw(micros) {
            Ok(()) => Response::success(tag),
            Err(AudioError::NoAudio) => Response::invalid(tag, messages::MSG_CMD_NEEDS_LOADED),
            Err(AudioError::Seek(e)) => {
                // The decoder didn't like the position, which almost
                // always means it's past the end. Make it look as if
                // playback ran off the end naturally.
                log::debug!("seek failure: {e}");
                self.end(tag)
            }
            Err(e) => Response::failure(tag, &e.to_string()),
        }
    }

    /// Handles the end of a file, natural or forced: announce it, stop,
    /// and rewind to the start. The file stays loaded and can be
    /// replayed.
    fn end(&mut self, tag: &str) -> Response {
        if self.file.state() == AudioState::Ejected {
            return Response::invalid(tag, messages::MSG_CMD_NEEDS_LOADED);
        }

        self.broadcast(Response::unsolicited(Code::End));

        if let Err(e) = self.file.set_playing(false) {
            log::warn!("couldn't stop at end: {e}");
        }
        self.dump_state(Target::Broadcast);

        // Rewind through the raw path: a failing seek in here must not
        // re-enter end() and loop.
        if let Err(e) = self.pos_raw(0) {
            log::warn!("couldn't rewind at end: {e}");
        }

        Response::success(tag)
    }

    fn dump(&mut self, id: ClientId, tag: &str) -> Response {
        self.dump_to(Target::Client(id));
        Response::success(tag)
    }

    //
    // Helpers
    //

    /// Seeks and announces, without any end-of-file handling.
    fn pos_raw(&mut self, micros: u64) -> Result<()> {
        self.file.set_position(micros)?;
        self.position.reset();
        self.broadcast(Response::unsolicited(Code::Pos).arg(&micros.to_string()));
        Ok(())
    }

    fn eject_inner(&mut self) {
        self.file = self.system.null();
        self.position.reset();
        self.dump_state(Target::Broadcast);
    }

    /// Emits the full observable state: file, length and position when
    /// loaded, then the state code, then the end-of-dump marker.
    fn dump_to(&self, target: Target) {
        self.dump_raw(target, true);
        self.send(target, Response::unsolicited(Code::Dump));
    }

    /// Emits file information (if any) followed by the state code. The
    /// length line is reserved for full dumps; load broadcasts carry
    /// just the file and position.
    fn dump_raw(&self, target: Target, include_length: bool) {
        if self.file.state() != AudioState::Ejected {
            if let Ok(path) = self.file.file() {
                self.send(target, Response::unsolicited(Code::Fload).arg(path));
            }
            if include_length {
                if let Ok(length) = self.file.length_micros() {
                    self.send(
                        target,
                        Response::unsolicited(Code::Len).arg(&length.to_string()),
                    );
                }
            }
            if let Ok(pos) = self.file.position() {
                self.send(target, Response::unsolicited(Code::Pos).arg(&pos.to_string()));
            }
        }

        self.dump_state(target);
    }

    fn dump_state(&self, target: Target) {
        let code = match self.file.state() {
            AudioState::Ejected => Code::Eject,
            AudioState::Stopped => Code::Stop,
            AudioState::Playing => Code::Play,
            AudioState::AtEnd => Code::End,
        };
        self.send(target, Response::unsolicited(code));
    }

    fn send(&self, target: Target, response: Response) {
        self.sink.respond(target, response);
    }

    fn broadcast(&self, response: Response) {
        self.send(Target::Broadcast, response);
    }
}

/// Parses a position argument: a plain non-negative decimal count of
/// microseconds. Anything else, including trailing junk, is rejected.
fn parse_pos(arg: &str) -> Option<u64> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const LENGTH: u64 = 60_000_000; // a one-minute file
    const PERIOD: u64 = 1_000_000;

    //
    // Test doubles: a scripted audio object the tests can reach into,
    // a system that vends them, and a recording response sink.
    //

    struct DummyInner {
        state: AudioState,
        position: u64,
        length: u64,
        path: String,
    }

    struct DummyAudio {
        /// The path never changes after load; keeping a copy outside
        /// the cell lets `file` hand out a plain reference.
        path: String,
        inner: Rc<RefCell<DummyInner>>,
    }

    impl Audio for DummyAudio {
        fn update(&mut self) -> Result<AudioState> {
            Ok(self.inner.borrow().state)
        }

        fn state(&self) -> AudioState {
            self.inner.borrow().state
        }

        fn set_playing(&mut self, playing: bool) -> Result<()> {
            let mut inner = self.inner.borrow_mut();
            inner.state = if playing {
                AudioState::Playing
            } else {
                AudioState::Stopped
            };
            Ok(())
        }

        fn position(&self) -> Result<u64> {
            Ok(self.inner.borrow().position)
        }

        fn set_position(&mut self, micros: u64) -> Result<()> {
            let mut inner = self.inner.borrow_mut();
            if micros > inner.length {
                return Err(AudioError::Seek("past end".to_string()));
            }
            inner.position = micros;
            if inner.state == AudioState::AtEnd {
                inner.state = AudioState::Stopped;
            }
            Ok(())
        }

        fn file(&self) -> Result<&str> {
            Ok(&self.path)
        }

        fn length_micros(&self) -> Result<u64> {
            Ok(self.inner.borrow().length)
        }
    }

    type Handle = Rc<RefCell<DummyInner>>;

    struct DummySystem {
        loaded: Rc<RefCell<Option<Handle>>>,
    }

    impl AudioSystem for DummySystem {
        fn null(&self) -> Box<dyn Audio> {
            *self.loaded.borrow_mut() = None;
            Box::new(playd_audio::NullAudio)
        }

        fn load(&self, path: &str) -> Result<Box<dyn Audio>> {
            if path.ends_with(".bad") {
                return Err(AudioError::File(format!("couldn't open '{path}'")));
            }
            let inner = Rc::new(RefCell::new(DummyInner {
                state: AudioState::Stopped,
                position: 0,
                length: LENGTH,
                path: path.to_string(),
            }));
            *self.loaded.borrow_mut() = Some(Rc::clone(&inner));
            Ok(Box::new(DummyAudio {
                path: path.to_string(),
                inner,
            }))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<(Target, String)>>>);

    impl ResponseSink for RecordingSink {
        fn respond(&self, target: Target, response: Response) {
            self.0.borrow_mut().push((target, response.pack().to_string()));
        }
    }

    struct Fixture {
        player: Player,
        recorded: Rc<RefCell<Vec<(Target, String)>>>,
        loaded: Rc<RefCell<Option<Handle>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let sink = RecordingSink::default();
            let recorded = Rc::clone(&sink.0);
            let loaded = Rc::new(RefCell::new(None));
            let system = DummySystem {
                loaded: Rc::clone(&loaded),
            };
            Fixture {
                player: Player::new(Box::new(system), Box::new(sink), PERIOD),
                recorded,
                loaded,
            }
        }

        /// Runs a command line, returning the packed ACK.
        fn cmd(&mut self, line: &[&str]) -> String {
            let words: Vec<String> = line.iter().map(|w| w.to_string()).collect();
            self.player.run_command(&words, 1).pack().to_string()
        }

        /// Drains and returns everything emitted since the last drain.
        fn emitted(&self) -> Vec<(Target, String)> {
            std::mem::take(&mut *self.recorded.borrow_mut())
        }

        /// The packed lines only, any target.
        fn lines(&self) -> Vec<String> {
            self.emitted().into_iter().map(|(_, line)| line).collect()
        }

        fn handle(&self) -> Handle {
            Rc::clone(self.loaded.borrow().as_ref().expect("a file is loaded"))
        }
    }

    //
    // Scenario transcripts
    //

    #[test]
    fn fresh_start_welcome_and_dump() {
        let fixture = Fixture::new();
        fixture.player.welcome_client(7);

        let emitted = fixture.emitted();
        let lines: Vec<&str> = emitted.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                format!("! OHAI 7 '{}'", messages::MSG_OHAI).as_str(),
                "! IAMA player/file",
                "! EJECT",
                "! DUMP",
                "! ACK OK Success",
            ]
        );
        // Everything goes to the new client only.
        assert!(emitted.iter().all(|(t, _)| *t == Target::Client(7)));
    }

    #[test]
    fn load_then_play() {
        let mut fixture = Fixture::new();

        let ack = fixture.cmd(&["t1", "load", "/f.mp3"]);
        assert_eq!(ack, "t1 ACK OK Success");
        assert_eq!(
            fixture.lines(),
            vec!["! FLOAD /f.mp3", "! POS 0", "! STOP"]
        );

        let ack = fixture.cmd(&["t2", "play"]);
        assert_eq!(ack, "t2 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! PLAY"]);
        assert_eq!(fixture.handle().borrow().state, AudioState::Playing);
    }

    #[test]
    fn seek_within_range() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t3", "pos", "5000000"]);
        assert_eq!(ack, "t3 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! POS 5000000"]);
        assert_eq!(fixture.handle().borrow().position, 5_000_000);
    }

    #[test]
    fn seek_past_end_behaves_like_natural_eof() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t4", "pos", "120000000"]);
        assert_eq!(ack, "t4 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! END", "! STOP", "! POS 0"]);
        assert_eq!(fixture.handle().borrow().position, 0);
    }

    #[test]
    fn natural_eof_stops_rewinds_and_allows_replay() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/short.mp3"]);
        fixture.cmd(&["t2", "play"]);
        fixture.emitted();

        // The pipeline plays out and reports the end.
        fixture.handle().borrow_mut().state = AudioState::AtEnd;
        assert!(fixture.player.update().unwrap());

        assert_eq!(fixture.lines(), vec!["! END", "! STOP", "! POS 0"]);
        let handle = fixture.handle();
        assert_eq!(handle.borrow().state, AudioState::Stopped);
        assert_eq!(handle.borrow().position, 0);

        // Not ejected: play restarts from the beginning.
        let ack = fixture.cmd(&["t3", "play"]);
        assert_eq!(ack, "t3 ACK OK Success");
        assert_eq!(fixture.handle().borrow().state, AudioState::Playing);
    }

    #[test]
    fn short_command_is_a_client_error_and_changes_nothing() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t5", "load"]);
        assert_eq!(
            ack,
            format!("t5 ACK WHAT '{}'", messages::MSG_CMD_INVALID)
        );
        assert!(fixture.lines().is_empty());
        assert_eq!(fixture.handle().borrow().state, AudioState::Stopped);
    }

    //
    // State-table checks
    //

    #[test]
    fn play_stop_pos_are_invalid_while_ejected() {
        let mut fixture = Fixture::new();

        for line in [
            vec!["t1", "play"],
            vec!["t2", "stop"],
            vec!["t3", "pos", "0"],
            vec!["t4", "end"],
        ] {
            let ack = fixture.cmd(&line);
            assert!(
                ack.contains("ACK WHAT"),
                "expected WHAT for {line:?}, got {ack}"
            );
        }
        assert!(fixture.lines().is_empty());
    }

    #[test]
    fn eject_always_succeeds() {
        let mut fixture = Fixture::new();

        // Ejecting while ejected is fine and announces the state.
        assert_eq!(fixture.cmd(&["t1", "eject"]), "t1 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! EJECT"]);

        fixture.cmd(&["t2", "load", "/f.mp3"]);
        fixture.cmd(&["t3", "play"]);
        fixture.emitted();

        assert_eq!(fixture.cmd(&["t4", "eject"]), "t4 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! EJECT"]);
        assert!(fixture.loaded.borrow().is_none());
    }

    #[test]
    fn play_and_stop_are_idempotent() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);

        assert_eq!(fixture.cmd(&["t2", "stop"]), "t2 ACK OK Success");
        assert_eq!(fixture.cmd(&["t3", "play"]), "t3 ACK OK Success");
        assert_eq!(fixture.cmd(&["t4", "play"]), "t4 ACK OK Success");
        assert_eq!(fixture.handle().borrow().state, AudioState::Playing);
    }

    #[test]
    fn load_replaces_the_current_file() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/a.mp3"]);
        fixture.cmd(&["t2", "play"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t3", "load", "/b.mp3"]);
        assert_eq!(ack, "t3 ACK OK Success");
        assert_eq!(
            fixture.lines(),
            vec!["! FLOAD /b.mp3", "! POS 0", "! STOP"]
        );
        assert_eq!(fixture.handle().borrow().path, "/b.mp3");
        assert_eq!(fixture.handle().borrow().state, AudioState::Stopped);
    }

    #[test]
    fn failed_load_leaves_the_player_ejected() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/a.mp3"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t2", "load", "/broken.bad"]);
        assert!(ack.starts_with("t2 ACK FAIL "), "got {ack}");
        assert_eq!(fixture.lines(), vec!["! EJECT"]);
        assert!(fixture.loaded.borrow().is_none());

        // And the old file is gone too: play is now invalid.
        let ack = fixture.cmd(&["t3", "play"]);
        assert!(ack.contains("ACK WHAT"));
    }

    #[test]
    fn load_rejects_an_empty_path() {
        let mut fixture = Fixture::new();
        let ack = fixture.cmd(&["t1", "load", ""]);
        assert_eq!(
            ack,
            format!("t1 ACK WHAT '{}'", messages::MSG_LOAD_EMPTY_PATH)
        );
    }

    #[test]
    fn pos_rejects_malformed_positions() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        for bad in ["", "abc", "12abc", "-5", "+5", "5s", "1.5"] {
            let ack = fixture.cmd(&["t2", "pos", bad]);
            assert_eq!(
                ack,
                format!("t2 ACK WHAT '{}'", messages::MSG_SEEK_INVALID_VALUE),
                "for input {bad:?}"
            );
        }
        // None of those touched the position.
        assert_eq!(fixture.handle().borrow().position, 0);
    }

    #[test]
    fn unknown_verbs_are_invalid() {
        let mut fixture = Fixture::new();
        let ack = fixture.cmd(&["t1", "frobnicate"]);
        assert_eq!(
            ack,
            format!("t1 ACK WHAT '{}'", messages::MSG_CMD_INVALID)
        );
        // Wrong arity counts too.
        let ack = fixture.cmd(&["t2", "play", "loudly"]);
        assert!(ack.contains("ACK WHAT"));
    }

    #[test]
    fn quit_ejects_and_refuses_further_commands() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        assert_eq!(fixture.cmd(&["t2", "quit"]), "t2 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! EJECT"]);
        assert!(!fixture.player.update().unwrap());

        let ack = fixture.cmd(&["t3", "play"]);
        assert_eq!(
            ack,
            format!("t3 ACK FAIL '{}'", messages::MSG_PLAYER_CLOSING)
        );
    }

    #[test]
    fn forced_end_requires_a_loaded_file() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t2", "end"]);
        assert_eq!(ack, "t2 ACK OK Success");
        assert_eq!(fixture.lines(), vec!["! END", "! STOP", "! POS 0"]);
    }

    #[test]
    fn dump_goes_to_the_requesting_client_only() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.cmd(&["t2", "pos", "5000000"]);
        fixture.emitted();

        let ack = fixture.cmd(&["t3", "dump"]);
        assert_eq!(ack, "t3 ACK OK Success");

        let emitted = fixture.emitted();
        assert!(emitted.iter().all(|(t, _)| *t == Target::Client(1)));
        let lines: Vec<&str> = emitted.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "! FLOAD /f.mp3",
                format!("! LEN {LENGTH}").as_str(),
                "! POS 5000000",
                "! STOP",
                "! DUMP",
            ]
        );
    }

    //
    // Position announcements
    //

    #[test]
    fn playing_updates_announce_position_at_the_period() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.cmd(&["t2", "play"]);
        fixture.emitted();

        // First playing update announces immediately (tracker was
        // reset by the load).
        fixture.handle().borrow_mut().position = 10_000;
        fixture.player.update().unwrap();
        assert_eq!(fixture.lines(), vec!["! POS 10000"]);

        // Sub-period progress stays quiet.
        fixture.handle().borrow_mut().position = 400_000;
        fixture.player.update().unwrap();
        assert!(fixture.lines().is_empty());

        // A full period later it speaks again.
        fixture.handle().borrow_mut().position = 1_010_000;
        fixture.player.update().unwrap();
        assert_eq!(fixture.lines(), vec!["! POS 1010000"]);
    }

    #[test]
    fn stopped_updates_stay_quiet() {
        let mut fixture = Fixture::new();
        fixture.cmd(&["t1", "load", "/f.mp3"]);
        fixture.emitted();

        for _ in 0..5 {
            fixture.player.update().unwrap();
        }
        assert!(fixture.lines().is_empty());
    }
}
