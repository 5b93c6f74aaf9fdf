//! Streaming UTF-8 decoding
//!
//! Bytes arrive one at a time and a sequence may straddle `feed` calls.
//! Malformed input decodes to U+FFFD. When a byte ends a sequence early
//! it is not part of the bad sequence and must be decoded again.

/// Replacement for malformed input
pub const REPLACEMENT: char = '\u{FFFD}';

/// UTF-8 decoder state
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    codepoint: u32,
    /// Continuation bytes still expected
    remaining: u8,
    /// Valid range for the next continuation byte
    lower: u8,
    upper: u8,
}

/// Result of feeding a byte to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Result {
    /// Need more bytes
    Pending,
    /// Successfully decoded a character
    Char(char),
    /// Malformed input. With `reprocess` set the byte was not consumed and
    /// should be fed again after the replacement character.
    Invalid { reprocess: bool },
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// In the middle of a multi-byte sequence
    pub fn is_pending(&self) -> bool {
        self.remaining > 0
    }

    pub fn feed(&mut self, byte: u8) -> Utf8Result {
        if self.remaining == 0 {
            return self.start(byte);
        }
        if !(self.lower..=self.upper).contains(&byte) {
            self.reset();
            return Utf8Result::Invalid { reprocess: true };
        }
        self.codepoint = (self.codepoint << 6) | u32::from(byte & 0x3F);
        self.remaining -= 1;
        self.lower = 0x80;
        self.upper = 0xBF;
        if self.remaining > 0 {
            return Utf8Result::Pending;
        }
        let cp = self.codepoint;
        self.reset();
        // Lead and second-byte ranges exclude surrogates and overlongs
        char::from_u32(cp).map_or(Utf8Result::Invalid { reprocess: false }, Utf8Result::Char)
    }

    fn start(&mut self, byte: u8) -> Utf8Result {
        let (remaining, lower, upper, bits) = match byte {
            0x00..=0x7F => return Utf8Result::Char(char::from(byte)),
            0xC2..=0xDF => (1, 0x80, 0xBF, byte & 0x1F),
            0xE0 => (2, 0xA0, 0xBF, byte & 0x0F),
            0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80, 0xBF, byte & 0x0F),
            0xED => (2, 0x80, 0x9F, byte & 0x0F),
            0xF0 => (3, 0x90, 0xBF, byte & 0x07),
            0xF1..=0xF3 => (3, 0x80, 0xBF, byte & 0x07),
            0xF4 => (3, 0x80, 0x8F, byte & 0x07),
            _ => return Utf8Result::Invalid { reprocess: false },
        };
        self.codepoint = u32::from(bits);
        self.remaining = remaining;
        self.lower = lower;
        self.upper = upper;
        Utf8Result::Pending
    }
}
