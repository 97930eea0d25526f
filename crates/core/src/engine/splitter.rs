//! Line splitting for the encoder's human-readable stream.
//!
//! ffmpeg redraws its status line in place using a bare `\r`, so a plain
//! line reader would hold those updates until the next `\n`. Here either
//! byte ends a token.

/// Outcome of one splitting step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split<'a> {
    /// A delimited token; `consumed` includes the delimiter.
    Token { consumed: usize, token: &'a [u8] },
    /// Undelimited bytes left at end of input.
    Final(&'a [u8]),
    /// No delimiter yet; read more.
    NeedMore,
    /// End of input with nothing left.
    Done,
}

/// Splits the front of `buf` at the first `\r` or `\n`.
pub fn split(buf: &[u8], at_eof: bool) -> Split<'_> {
    if let Some(i) = buf.iter().position(|&b| b == b'\r' || b == b'\n') {
        return Split::Token {
            consumed: i + 1,
            token: &buf[..i],
        };
    }
    match (at_eof, buf.is_empty()) {
        (true, true) => Split::Done,
        (true, false) => Split::Final(buf),
        (false, _) => Split::NeedMore,
    }
}

/// Owned, growing buffer driven by [`split`].
#[derive(Debug, Default)]
pub struct TokenBuffer {
    buf: Vec<u8>,
    at_eof: bool,
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Marks the end of input; the remainder becomes a final token.
    pub fn finish(&mut self) {
        self.at_eof = true;
    }

    /// Takes the next complete token, if any.
    pub fn next_token(&mut self) -> Option<Vec<u8>> {
        let (consumed, token) = match split(&self.buf, self.at_eof) {
            Split::Token { consumed, token } => (consumed, token.to_vec()),
            Split::Final(rest) => (rest.len(), rest.to_vec()),
            Split::NeedMore | Split::Done => return None,
        };
        self.buf.drain(..consumed);
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8]) -> Vec<String> {
        let mut buffer = TokenBuffer::new();
        buffer.push(input);
        buffer.finish();
        std::iter::from_fn(|| buffer.next_token())
            .map(|t| String::from_utf8(t).unwrap())
            .collect()
    }

    #[test]
    fn test_crlf_yields_empty_token() {
        assert_eq!(collect(b"a\r\nb\rc\n"), vec!["a", "", "b", "c"]);
    }

    #[test]
    fn test_trailing_bytes_become_final_token() {
        assert_eq!(collect(b"frame=1\rframe=2"), vec!["frame=1", "frame=2"]);
    }

    #[test]
    fn test_split_states() {
        assert_eq!(split(b"", true), Split::Done);
        assert_eq!(split(b"abc", false), Split::NeedMore);
        assert_eq!(split(b"abc", true), Split::Final(b"abc"));
        assert_eq!(
            split(b"ab\ncd", false),
            Split::Token {
                consumed: 3,
                token: b"ab"
            }
        );
    }

    #[test]
    fn test_incremental_push() {
        let mut buffer = TokenBuffer::new();
        buffer.push(b"hel");
        assert_eq!(buffer.next_token(), None);
        buffer.push(b"lo\rwor");
        assert_eq!(buffer.next_token(), Some(b"hello".to_vec()));
        assert_eq!(buffer.next_token(), None);
        buffer.finish();
        assert_eq!(buffer.next_token(), Some(b"wor".to_vec()));
        assert_eq!(buffer.next_token(), None);
    }
}
