//! Decodes query text into Unicode scalar values, one at a time.

/// A source of Unicode scalar values consumed by the lexer.
pub trait CharReader {
    /// Returns the next scalar value, or `None` once the input is exhausted.
    fn try_read_next(&mut self) -> Option<char>;
}

/// Decodes a UTF-8 byte slice.
///
/// Malformed sequences decode to U+FFFD and consume a single byte, the same
/// way a lossy standard decoder does.
#[derive(Debug, Clone)]
pub struct Utf8Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Utf8Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn continuation(&self, offset: usize) -> Option<u32> {
        let byte = *self.bytes.get(self.position + offset)?;
        (byte & 0xC0 == 0x80).then_some(u32::from(byte & 0x3F))
    }

    fn decode_sequence(&self, lead: u8) -> Option<(char, usize)> {
        let (width, initial) = match lead {
            0xC2..=0xDF => (2, u32::from(lead & 0x1F)),
            0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
            0xF0..=0xF4 => (4, u32::from(lead & 0x07)),
            _ => return None,
        };
        let mut scalar = initial;
        for offset in 1..width {
            scalar = (scalar << 6) | self.continuation(offset)?;
        }
        let minimum = match width {
            2 => 0x80,
            3 => 0x800,
            _ => 0x1_0000,
        };
        if scalar < minimum {
            return None;
        }
        // `from_u32` rejects surrogates and values above U+10FFFF.
        char::from_u32(scalar).map(|c| (c, width))
    }
}

impl CharReader for Utf8Reader<'_> {
    fn try_read_next(&mut self) -> Option<char> {
        let lead = *self.bytes.get(self.position)?;
        if lead < 0x80 {
            self.position += 1;
            return Some(char::from(lead));
        }
        match self.decode_sequence(lead) {
            Some((c, width)) => {
                self.position += width;
                Some(c)
            }
            None => {
                self.position += 1;
                Some(char::REPLACEMENT_CHARACTER)
            }
        }
    }
}

/// Reads scalar values from an already-decoded string.
#[derive(Debug, Clone)]
pub struct StrReader<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> StrReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { chars: text.chars() }
    }
}

impl CharReader for StrReader<'_> {
    fn try_read_next(&mut self) -> Option<char> {
        self.chars.next()
    }
}
