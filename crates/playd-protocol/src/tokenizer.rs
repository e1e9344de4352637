//! Streaming request tokeniser.
//!
//! Splits raw bytes from a client connection into lines of words, with
//! POSIX-shell-style quoting: single quotes (literal), double quotes
//! (backslash escapes honoured), and bare backslash escapes. The
//! tokeniser is a byte-at-a-time state machine so it can be fed partial
//! reads in any split and resume exactly where it left off.

/// Which kind of quotation the tokeniser is currently inside, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    /// Not in a quoted region.
    None,
    /// Inside `'...'`: everything is literal until the closing quote.
    Single,
    /// Inside `"..."`: backslash escapes are honoured.
    Double,
}

/// A resumable word/line tokeniser for one client connection.
#[derive(Debug)]
pub struct Tokenizer {
    /// The next byte is escaped, regardless of state.
    escape_next: bool,
    /// Whether bytes have been pushed into the current word. Needed to
    /// distinguish `''` (an empty word) from no word at all.
    in_word: bool,
    quote: Quote,
    word: Vec<u8>,
    words: Vec<String>,
    lines: Vec<Vec<String>>,
}

impl Tokenizer {
    /// Creates a tokeniser in its initial state.
    pub fn new() -> Self {
        Tokenizer {
            escape_next: false,
            in_word: false,
            quote: Quote::None,
            word: Vec::new(),
            words: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Feeds raw bytes into the tokeniser, returning every line
    /// completed by this feed. Incomplete trailing input is retained
    /// for the next call.
    pub fn feed(&mut self, raw: &[u8]) -> Vec<Vec<String>> {
        for &b in raw {
            if self.escape_next {
                self.push(b);
                continue;
            }

            match self.quote {
                Quote::Single => {
                    if b == b'\'' {
                        self.quote = Quote::None;
                    } else {
                        self.push(b);
                    }
                }
                Quote::Double => match b {
                    b'"' => self.quote = Quote::None,
                    b'\\' => self.escape_next = true,
                    _ => self.push(b),
                },
                Quote::None => match b {
                    b'\n' => self.emit(),
                    b'\'' => {
                        self.in_word = true;
                        self.quote = Quote::Single;
                    }
                    b'"' => {
                        self.in_word = true;
                        self.quote = Quote::Double;
                    }
                    b'\\' => self.escape_next = true,
                    // CR is plain whitespace here, which is what makes
                    // CRLF line endings work for free.
                    _ if b.is_ascii_whitespace() => self.end_word(),
                    _ => self.push(b),
                },
            }
        }

        std::mem::take(&mut self.lines)
    }

    fn push(&mut self, b: u8) {
        self.in_word = true;
        self.escape_next = false;
        self.word.push(b);
    }

    fn end_word(&mut self) {
        if !self.in_word {
            return;
        }
        self.in_word = false;

        let word = std::mem::take(&mut self.word);
        self.words.push(String::from_utf8_lossy(&word).into_owned());
    }

    /// Ends the current line. A newline also terminates the word in
    /// progress, if any.
    fn emit(&mut self) {
        self.end_word();
        self.lines.push(std::mem::take(&mut self.words));
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(input: &str) -> Vec<Vec<String>> {
        Tokenizer::new().feed(input.as_bytes())
    }

    fn line(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn splits_simple_words() {
        assert_eq!(
            feed_all("t1 load /music/a.mp3\n"),
            vec![line(&["t1", "load", "/music/a.mp3"])]
        );
    }

    #[test]
    fn collapses_repeated_whitespace() {
        assert_eq!(feed_all("a \t  b\n"), vec![line(&["a", "b"])]);
    }

    #[test]
    fn tolerates_crlf() {
        assert_eq!(feed_all("t1 play\r\n"), vec![line(&["t1", "play"])]);
    }

    #[test]
    fn empty_line_yields_empty_word_list() {
        assert_eq!(feed_all("\n"), vec![line(&[])]);
    }

    #[test]
    fn single_quotes_preserve_everything() {
        assert_eq!(
            feed_all("t1 load 'a file \"with\" \\stuff'\n"),
            vec![line(&["t1", "load", "a file \"with\" \\stuff"])]
        );
    }

    #[test]
    fn incomplete_line_is_not_emitted() {
        let mut t = Tokenizer::new();
        assert!(t.feed(b"t1 load 'two words.mp3'").is_empty());
        assert_eq!(t.feed(b"\n"), vec![line(&["t1", "load", "two words.mp3"])]);
    }

    #[test]
    fn single_quote_escape_sequence_round_trips() {
        // The emitter turns ' into '\''; make sure we read it back.
        assert_eq!(
            feed_all("t1 load 'it'\\''s.mp3'\n"),
            vec![line(&["t1", "load", "it's.mp3"])]
        );
    }

    #[test]
    fn double_quotes_honour_backslash() {
        assert_eq!(
            feed_all("t1 load \"a\\\"b\"\n"),
            vec![line(&["t1", "load", "a\"b"])]
        );
    }

    #[test]
    fn bare_backslash_escapes_whitespace() {
        assert_eq!(
            feed_all("t1 load two\\ words\n"),
            vec![line(&["t1", "load", "two words"])]
        );
    }

    #[test]
    fn escaped_newline_is_literal() {
        assert_eq!(feed_all("a\\\nb\n"), vec![line(&["a\nb"])]);
    }

    #[test]
    fn newline_inside_quotes_is_literal() {
        assert_eq!(feed_all("'a\nb'\n"), vec![line(&["a\nb"])]);
    }

    #[test]
    fn resumes_across_partial_feeds() {
        let mut t = Tokenizer::new();
        assert!(t.feed(b"t1 lo").is_empty());
        assert!(t.feed(b"ad 'half a ").is_empty());
        assert_eq!(
            t.feed(b"name'\nt2 play\n"),
            vec![line(&["t1", "load", "half a name"]), line(&["t2", "play"])]
        );
    }

    #[test]
    fn quoted_empty_string_is_a_word() {
        assert_eq!(feed_all("t1 load ''\n"), vec![line(&["t1", "load", ""])]);
    }

    #[test]
    fn multiple_lines_in_one_feed() {
        assert_eq!(
            feed_all("t1 play\nt2 stop\n"),
            vec![line(&["t1", "play"]), line(&["t2", "stop"])]
        );
    }

    #[test]
    fn non_utf8_bytes_are_replaced_not_fatal() {
        let mut t = Tokenizer::new();
        let lines = t.feed(b"t1 load /mus\xffic\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0], "t1");
        assert!(lines[0][2].contains('\u{fffd}'));
    }
}
