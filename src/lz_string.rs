//! LZ-based string compression with a URL-safe output alphabet.
//!
//! The bit layout matches the `lz-string` JavaScript library's
//! `compressToEncodedURIComponent` / `decompressFromEncodedURIComponent`
//! pair, so links produced by the web client decode here and vice versa.
//! Compression works on UTF-16 code units, the unit JavaScript strings use.
//!
//! Stream format: a dictionary code of `num_bits` bits (LSB first) per
//! phrase. Code 0 introduces an 8-bit literal, code 1 a 16-bit literal and
//! code 2 ends the stream; `num_bits` grows by one each time the dictionary
//! doubles. Output is packed six bits per character, MSB first.

use std::collections::{HashMap, HashSet};

use crate::error::InvalidToken;

/// Characters a token may contain. None of them need percent-encoding inside
/// a URL fragment, and none collide with the router's `/`, `#` or `?`.
pub const URI_SAFE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+-";

const BITS_PER_CHAR: u32 = 6;
const CHAR_HIGH_BIT: u32 = 1 << (BITS_PER_CHAR - 1);

const CODE_LITERAL_8: u32 = 0;
const CODE_LITERAL_16: u32 = 1;
const CODE_END: u32 = 2;

// Widths beyond this can only come from a hostile stream.
const MAX_CODE_BITS: u32 = 31;

/// Compress `input` into a string drawn from [`URI_SAFE_ALPHABET`].
pub fn compress_to_uri_component(input: &str) -> String {
    let mut compressor = Compressor::new();
    let mut phrase: Vec<u16> = Vec::new();

    for unit in input.encode_utf16() {
        let single = [unit];
        if !compressor.dictionary.contains_key(&single[..]) {
            compressor.add_phrase(single.to_vec());
            compressor.pending_literals.insert(single.to_vec());
        }

        let mut extended = phrase.clone();
        extended.push(unit);
        if compressor.dictionary.contains_key(&extended) {
            phrase = extended;
        } else {
            compressor.emit_phrase(&phrase);
            compressor.add_phrase(extended);
            phrase = single.to_vec();
        }
    }

    if !phrase.is_empty() {
        compressor.emit_phrase(&phrase);
    }

    compressor.writer.write_bits(CODE_END, compressor.num_bits);
    compressor.writer.finish()
}

/// Reverse [`compress_to_uri_component`].
///
/// Spaces are read as `+`, since form-style URL decoding turns one into the
/// other. Anything that is not a complete, well-formed stream is rejected.
pub fn decompress_from_uri_component(input: &str) -> Result<String, InvalidToken> {
    if input.is_empty() {
        return Err(InvalidToken::Missing);
    }

    let values = input
        .bytes()
        .map(|byte| if byte == b' ' { b'+' } else { byte })
        .map(sextet)
        .collect::<Option<Vec<u32>>>()
        .ok_or(InvalidToken::Alphabet)?;

    let units = decompress_units(&values).ok_or(InvalidToken::Corrupt)?;
    String::from_utf16(&units).map_err(|_| InvalidToken::Corrupt)
}

// The JS key string also lists '$' at index 64, which six bits never reach.
fn sextet(byte: u8) -> Option<u32> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'-' => 63,
        _ => return None,
    };
    Some(u32::from(value))
}

struct Compressor {
    dictionary: HashMap<Vec<u16>, u32>,
    /// Single code units added to the dictionary but not yet written out as
    /// literals.
    pending_literals: HashSet<Vec<u16>>,
    next_code: u32,
    enlarge_in: u32,
    num_bits: u32,
    writer: BitWriter,
}

impl Compressor {
    fn new() -> Self {
        Self {
            dictionary: HashMap::new(),
            pending_literals: HashSet::new(),
            next_code: 3,
            enlarge_in: 2,
            num_bits: 2,
            writer: BitWriter::default(),
        }
    }

    fn add_phrase(&mut self, phrase: Vec<u16>) {
        self.dictionary.insert(phrase, self.next_code);
        self.next_code += 1;
    }

    fn emit_phrase(&mut self, phrase: &[u16]) {
        if self.pending_literals.remove(phrase) {
            let unit = u32::from(phrase[0]);
            if unit < 256 {
                self.writer.write_bits(CODE_LITERAL_8, self.num_bits);
                self.writer.write_bits(unit, 8);
            } else {
                self.writer.write_bits(CODE_LITERAL_16, self.num_bits);
                self.writer.write_bits(unit, 16);
            }
            self.count_down();
        } else if let Some(&code) = self.dictionary.get(phrase) {
            self.writer.write_bits(code, self.num_bits);
        }
        self.count_down();
    }

    fn count_down(&mut self) {
        self.enlarge_in -= 1;
        if self.enlarge_in == 0 {
            self.enlarge_in = 1 << self.num_bits;
            self.num_bits += 1;
        }
    }
}

#[derive(Default)]
struct BitWriter {
    value: u32,
    position: u32,
    out: String,
}

impl BitWriter {
    fn write_bits(&mut self, mut bits: u32, count: u32) {
        for _ in 0..count {
            self.value = (self.value << 1) | (bits & 1);
            if self.position == BITS_PER_CHAR - 1 {
                self.push_char();
            } else {
                self.position += 1;
            }
            bits >>= 1;
        }
    }

    fn push_char(&mut self) {
        self.out.push(char::from(URI_SAFE_ALPHABET[self.value as usize]));
        self.value = 0;
        self.position = 0;
    }

    fn finish(mut self) -> String {
        loop {
            self.value <<= 1;
            if self.position == BITS_PER_CHAR - 1 {
                self.push_char();
                return self.out;
            }
            self.position += 1;
        }
    }
}

struct BitReader<'a> {
    values: &'a [u32],
    current: u32,
    mask: u32,
    next_index: usize,
}

impl<'a> BitReader<'a> {
    fn new(values: &'a [u32]) -> Self {
        Self {
            values,
            current: values.first().copied().unwrap_or(0),
            mask: CHAR_HIGH_BIT,
            next_index: 1,
        }
    }

    /// Past the end the stream reads as zero bits; callers check
    /// [`BitReader::exhausted`] once per phrase.
    fn read_bits(&mut self, count: u32) -> u32 {
        let mut bits = 0;
        for shift in 0..count {
            let bit = self.current & self.mask;
            self.mask >>= 1;
            if self.mask == 0 {
                self.mask = CHAR_HIGH_BIT;
                self.current = self.values.get(self.next_index).copied().unwrap_or(0);
                self.next_index += 1;
            }
            if bit != 0 {
                bits |= 1 << shift;
            }
        }
        bits
    }

    fn exhausted(&self) -> bool {
        self.next_index > self.values.len()
    }
}

fn decompress_units(values: &[u32]) -> Option<Vec<u16>> {
    let mut reader = BitReader::new(values);

    // Codes 0..=2 are reserved for the literal/end markers.
    let mut dictionary: Vec<Vec<u16>> = vec![Vec::new(); 3];
    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    let first = match reader.read_bits(2) {
        CODE_LITERAL_8 => reader.read_bits(8) as u16,
        CODE_LITERAL_16 => reader.read_bits(16) as u16,
        CODE_END => return Some(Vec::new()),
        _ => return None,
    };

    let mut previous = vec![first];
    dictionary.push(previous.clone());
    let mut output = previous.clone();

    loop {
        if reader.exhausted() || num_bits > MAX_CODE_BITS {
            return None;
        }

        let mut code = reader.read_bits(num_bits) as usize;
        match code as u32 {
            CODE_LITERAL_8 | CODE_LITERAL_16 => {
                let width = if code as u32 == CODE_LITERAL_8 { 8 } else { 16 };
                let unit = reader.read_bits(width) as u16;
                dictionary.push(vec![unit]);
                code = dictionary.len() - 1;
                enlarge_in -= 1;
            }
            CODE_END => return Some(output),
            _ => {}
        }

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let entry = match dictionary.get(code) {
            Some(known) if !known.is_empty() => known.clone(),
            // The one code the encoder may reference before the decoder has
            // built it: previous phrase plus its own first unit.
            None if code == dictionary.len() => {
                let mut entry = previous.clone();
                entry.push(previous[0]);
                entry
            }
            _ => return None,
        };

        output.extend_from_slice(&entry);
        let mut phrase = previous;
        phrase.push(entry[0]);
        dictionary.push(phrase);
        enlarge_in -= 1;
        previous = entry;

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }
    }
}
