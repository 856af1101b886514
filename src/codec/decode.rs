//! Hostile-input decoder for the canonical tree format
//!
//! Settings files come off disk, so the decoder treats every input as
//! untrusted: all reads are bounds-checked, container nesting and total
//! item count are capped, and any structural violation surfaces as a
//! `DecodeError` carrying the offending byte offset. Trailing bytes after
//! the top-level value are an error.

use crate::codec::value::{Dict, Value};
use crate::error::DecodeError;

/// Bounds applied while decoding untrusted input.
#[derive(Debug, Clone, Copy)]
pub struct DecodeLimits {
    /// Maximum container nesting depth below the top-level value.
    pub max_depth: usize,
    /// Maximum total number of decoded values.
    pub max_items: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_items: 1_000_000,
        }
    }
}

/// Decode a single top-level value with default limits.
pub fn decode(input: &[u8]) -> Result<Value, DecodeError> {
    decode_with_limits(input, DecodeLimits::default())
}

/// Decode a single top-level value with explicit limits.
pub fn decode_with_limits(input: &[u8], limits: DecodeLimits) -> Result<Value, DecodeError> {
    let mut decoder = Decoder {
        input,
        pos: 0,
        items: 0,
        limits,
    };
    let value = decoder.parse_value(0)?;
    if decoder.pos != input.len() {
        return Err(DecodeError::TrailingBytes {
            offset: decoder.pos,
        });
    }
    Ok(value)
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    items: usize,
    limits: DecodeLimits,
}

impl<'a> Decoder<'a> {
    fn parse_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > self.limits.max_depth {
            return Err(DecodeError::DepthLimitExceeded { offset: self.pos });
        }
        self.items += 1;
        if self.items > self.limits.max_items {
            return Err(DecodeError::ItemLimitExceeded { offset: self.pos });
        }

        match self.peek()? {
            b'i' => self.parse_integer(),
            b'l' => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.parse_value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Value::List(items))
            }
            b'd' => {
                self.pos += 1;
                let mut entries = Dict::new();
                while self.peek()? != b'e' {
                    let key = self.parse_bytes()?;
                    let value = self.parse_value(depth + 1)?;
                    // Duplicate keys are tolerated; the last one wins
                    entries.insert(key, value);
                }
                self.pos += 1;
                Ok(Value::Dict(entries))
            }
            b'0'..=b'9' => Ok(Value::Bytes(self.parse_bytes()?)),
            byte => Err(DecodeError::UnknownToken {
                offset: self.pos,
                byte,
            }),
        }
    }

    fn parse_integer(&mut self) -> Result<Value, DecodeError> {
        let start = self.pos;
        self.pos += 1; // consume 'i'
        let digits_start = self.pos;
        while self.peek()? != b'e' {
            self.pos += 1;
        }
        let digits = &self.input[digits_start..self.pos];
        self.pos += 1; // consume 'e'

        parse_decimal_i64(digits)
            .map(Value::Integer)
            .ok_or(DecodeError::InvalidInteger { offset: start })
    }

    /// Parse a length-prefixed byte string: `<len>:<bytes>`.
    fn parse_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let start = self.pos;
        if !self.peek()?.is_ascii_digit() {
            return Err(DecodeError::UnknownToken {
                offset: self.pos,
                byte: self.input[self.pos],
            });
        }

        let mut len: usize = 0;
        loop {
            match self.peek()? {
                byte @ b'0'..=b'9' => {
                    len = len
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(byte - b'0')))
                        .ok_or(DecodeError::InvalidLength { offset: start })?;
                    self.pos += 1;
                }
                b':' => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(DecodeError::InvalidLength { offset: start }),
            }
        }

        let remaining = self.input.len() - self.pos;
        if len > remaining {
            return Err(DecodeError::LengthOutOfBounds {
                offset: start,
                length: len,
                remaining,
            });
        }
        let bytes = self.input[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }

    fn peek(&self) -> Result<u8, DecodeError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })
    }
}

/// Strict decimal parse: rejects empty input, a bare sign, leading zeros on
/// nonzero values, negative zero, and anything that overflows i64.
fn parse_decimal_i64(digits: &[u8]) -> Option<i64> {
    let (negative, magnitude) = match digits.split_first()? {
        (b'-', rest) => (true, rest),
        _ => (false, digits),
    };
    if magnitude.is_empty() || !magnitude.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if magnitude[0] == b'0' && (magnitude.len() > 1 || negative) {
        return None;
    }
    // All bytes are ASCII by construction
    let text = std::str::from_utf8(digits).ok()?;
    text.parse::<i64>().ok()
}
