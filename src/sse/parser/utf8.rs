//! Incremental UTF-8 decoding across chunk boundaries.

/// Replacement for byte sequences that can never become valid UTF-8
const REPLACEMENT: char = '\u{FFFD}';

/// Stateful decoder that holds back an incomplete trailing sequence until
/// the next chunk completes it.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Decode `chunk` (prefixed by any carried-over bytes) into `out`.
    pub fn decode_into(&mut self, chunk: &[u8], out: &mut String) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        while consumed < self.pending.len() {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    consumed = self.pending.len();
                }
                Err(err) => {
                    let (valid, _) = rest.split_at(err.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.push_str(valid);
                    }
                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push(REPLACEMENT);
                            consumed += err.valid_up_to() + invalid_len;
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            consumed += err.valid_up_to();
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }

    /// Number of bytes held back waiting for the rest of a character
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(chunks: &[&[u8]]) -> (String, usize) {
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        for chunk in chunks {
            decoder.decode_into(chunk, &mut out);
        }
        (out, decoder.pending_len())
    }

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(decode_all(&[b"hello"]), ("hello".to_string(), 0));
    }

    #[test]
    fn test_split_two_byte_char() {
        let bytes = "é".as_bytes();
        let (out, pending) = decode_all(&[&bytes[..1]]);
        assert_eq!(out, "");
        assert_eq!(pending, 1);

        assert_eq!(
            decode_all(&[&bytes[..1], &bytes[1..]]),
            ("é".to_string(), 0)
        );
    }

    #[test]
    fn test_four_byte_char_split_every_byte() {
        let bytes = "a😀b".as_bytes();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(decode_all(&chunks), ("a😀b".to_string(), 0));
    }

    #[test]
    fn test_invalid_byte_is_replaced() {
        let (out, pending) = decode_all(&[b"a\xFFb"]);
        assert_eq!(out, "a\u{FFFD}b");
        assert_eq!(pending, 0);
    }

    #[test]
    fn test_reset_drops_pending() {
        let mut decoder = Utf8Decoder::default();
        let mut out = String::new();
        decoder.decode_into(&"€".as_bytes()[..2], &mut out);
        assert_eq!(decoder.pending_len(), 2);
        decoder.reset();
        assert_eq!(decoder.pending_len(), 0);
    }
}
