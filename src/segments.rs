//! Per-mode segment encoding: Numeric, Alphanumeric, Byte and Kanji.
//!
//! A segment is an immutable value describing one input chunk. Alphabet
//! validation happens when the payload bits are written, not when the
//! segment is appended, so a bad character surfaces during `make()`.

use encoding_rs::SHIFT_JIS;

use crate::bits::BitBuffer;
use crate::error::{QrError, Result};
use crate::types::EncodeMode;

/// One input chunk with its encoding mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Digits 0-9, packed three to a 10-bit group.
    Numeric(String),
    /// The 45-symbol alphanumeric alphabet, packed two to 11 bits.
    Alphanumeric(String),
    /// Arbitrary 8-bit bytes, one byte per 8 bits.
    Byte(Vec<u8>),
    /// Shift-JIS encoded text, one 13-bit value per byte pair.
    Kanji(Vec<u8>),
}

impl Segment {
    /// A numeric segment over the given digit string.
    pub fn numeric(text: &str) -> Self {
        Self::Numeric(text.to_string())
    }

    /// An alphanumeric segment over the given text.
    pub fn alphanumeric(text: &str) -> Self {
        Self::Alphanumeric(text.to_string())
    }

    /// A byte segment encoding the text as UTF-8.
    pub fn byte_text(text: &str) -> Self {
        Self::Byte(text.as_bytes().to_vec())
    }

    /// A byte segment over pre-encoded bytes. This is the seam for callers
    /// that encode with something other than UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::Byte(bytes)
    }

    /// A Kanji segment encoding the text as Shift-JIS. Characters that do
    /// not map to the two double-byte Kanji ranges are reported as
    /// `BadKanji` when the segment is written.
    pub fn kanji_text(text: &str) -> Self {
        let (bytes, _, _) = SHIFT_JIS.encode(text);
        Self::Kanji(bytes.into_owned())
    }

    /// A Kanji segment over pre-encoded Shift-JIS bytes.
    pub fn from_sjis_bytes(bytes: Vec<u8>) -> Self {
        Self::Kanji(bytes)
    }

    /// Build a segment for `text` in the given mode.
    pub fn in_mode(text: &str, mode: EncodeMode) -> Self {
        match mode {
            EncodeMode::Numeric => Self::numeric(text),
            EncodeMode::Alphanumeric => Self::alphanumeric(text),
            EncodeMode::Byte => Self::byte_text(text),
            EncodeMode::Kanji => Self::kanji_text(text),
        }
    }

    /// The segment's encoding mode.
    pub fn mode(&self) -> EncodeMode {
        match self {
            Self::Numeric(_) => EncodeMode::Numeric,
            Self::Alphanumeric(_) => EncodeMode::Alphanumeric,
            Self::Byte(_) => EncodeMode::Byte,
            Self::Kanji(_) => EncodeMode::Kanji,
        }
    }

    /// Character count in mode units: characters for Numeric and
    /// Alphanumeric, bytes for Byte, byte pairs for Kanji.
    pub fn char_count(&self) -> usize {
        match self {
            Self::Numeric(text) | Self::Alphanumeric(text) => text.chars().count(),
            Self::Byte(bytes) => bytes.len(),
            Self::Kanji(bytes) => bytes.len() / 2,
        }
    }

    /// Payload size in bits, excluding the mode and count header.
    pub fn bit_len(&self) -> usize {
        match self {
            Self::Numeric(text) => {
                let n = text.chars().count();
                10 * (n / 3) + [0, 4, 7][n % 3]
            }
            Self::Alphanumeric(text) => {
                let n = text.chars().count();
                11 * (n / 2) + 6 * (n % 2)
            }
            Self::Byte(bytes) => 8 * bytes.len(),
            Self::Kanji(bytes) => 13 * (bytes.len() / 2),
        }
    }

    /// Emit the mode-specific payload bits, validating the input alphabet.
    pub fn write_bits(&self, buf: &mut BitBuffer) -> Result<()> {
        match self {
            Self::Numeric(text) => write_numeric(text, buf),
            Self::Alphanumeric(text) => write_alphanumeric(text, buf),
            Self::Byte(bytes) => {
                for &b in bytes {
                    buf.put(b as u32, 8);
                }
                Ok(())
            }
            Self::Kanji(bytes) => write_kanji(bytes, buf),
        }
    }
}

fn write_numeric(text: &str, buf: &mut BitBuffer) -> Result<()> {
    let digits = text
        .chars()
        .enumerate()
        .map(|(offset, c)| {
            c.to_digit(10).ok_or(QrError::BadCharacter {
                mode: EncodeMode::Numeric,
                offset,
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    let mut groups = digits.chunks_exact(3);
    for group in &mut groups {
        buf.put(group[0] * 100 + group[1] * 10 + group[2], 10);
    }
    match groups.remainder() {
        [d] => buf.put(*d, 4),
        [a, b] => buf.put(a * 10 + b, 7),
        _ => {}
    }
    Ok(())
}

fn alphanumeric_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        ' ' => Some(36),
        '$' => Some(37),
        '%' => Some(38),
        '*' => Some(39),
        '+' => Some(40),
        '-' => Some(41),
        '.' => Some(42),
        '/' => Some(43),
        ':' => Some(44),
        _ => None,
    }
}

fn write_alphanumeric(text: &str, buf: &mut BitBuffer) -> Result<()> {
    let values = text
        .chars()
        .enumerate()
        .map(|(offset, c)| {
            alphanumeric_value(c).ok_or(QrError::BadCharacter {
                mode: EncodeMode::Alphanumeric,
                offset,
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    let mut pairs = values.chunks_exact(2);
    for pair in &mut pairs {
        buf.put(pair[0] * 45 + pair[1], 11);
    }
    if let [v] = pairs.remainder() {
        buf.put(*v, 6);
    }
    Ok(())
}

fn write_kanji(bytes: &[u8], buf: &mut BitBuffer) -> Result<()> {
    if bytes.len() % 2 != 0 {
        return Err(QrError::BadKanji {
            offset: bytes.len() - 1,
        });
    }
    for (pair, offset) in bytes.chunks_exact(2).zip((0..).step_by(2)) {
        let code = u16::from_be_bytes([pair[0], pair[1]]);
        let rebased = if (0x8140..=0x9FFC).contains(&code) {
            code - 0x8140
        } else if (0xE040..=0xEBBF).contains(&code) {
            code - 0xC140
        } else {
            return Err(QrError::BadKanji { offset });
        };
        let value = (rebased >> 8) as u32 * 0xC0 + (rebased & 0xFF) as u32;
        buf.put(value, 13);
    }
    Ok(())
}
