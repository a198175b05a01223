//! Incremental pull-based JSON token reader
//!
//! Bytes arrive in chunks through [`TokenReader::feed`]; [`TokenReader::next`]
//! lexes one token at a time and reports [`ReadStep::NeedMoreData`] when the
//! buffered input ends mid-token, leaving the cursor at the token start so
//! the next call rescans once more bytes arrive. The reader tracks object
//! and array context itself, which lets it distinguish member names from
//! string values and validate separators as it goes.

use bytes::{Buf, BytesMut};

use crate::error::{Error, Result};
use crate::value::Number;

use super::token::{JsonToken, ReadStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// A value: at the root, after `:`, or after `,` in an array
    Value,
    /// First member name or `}` after `{`
    NameOrEnd,
    /// Member name after `,`
    Name,
    /// `:` after a member name
    Colon,
    /// `,` or the closing bracket of the current scope
    SepOrEnd,
    /// First element or `]` after `[`
    ValueOrEnd,
    /// Root value complete; only whitespace may remain
    Done,
}

/// Resumable token reader over an internal feed buffer
#[derive(Debug)]
pub struct TokenReader {
    buf: BytesMut,
    /// Cursor into `buf`; bytes before it are consumed on the next call
    pos: usize,
    /// Absolute offset of `buf[0]` within the overall stream
    consumed: u64,
    stack: Vec<Scope>,
    expect: Expect,
    end_of_input: bool,
}

impl Default for TokenReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenReader {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(8 * 1024),
            pos: 0,
            consumed: 0,
            stack: Vec::new(),
            expect: Expect::Value,
            end_of_input: false,
        }
    }

    /// Append a chunk of input
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Declare that no more input will arrive, letting a trailing number
    /// finalize and trailing-garbage checks run
    pub fn end_input(&mut self) {
        self.end_of_input = true;
    }

    /// Whether a complete root value has been consumed
    #[inline]
    pub fn at_end(&self) -> bool {
        self.expect == Expect::Done
    }

    /// Lex the next token
    ///
    /// # Errors
    ///
    /// `ErrorKind::Syntax` on malformed input; the message carries the
    /// absolute byte offset.
    pub fn next(&mut self) -> Result<ReadStep> {
        // Drop bytes consumed by the previous call
        if self.pos > 0 {
            self.consumed += self.pos as u64;
            self.buf.advance(self.pos);
            self.pos = 0;
        }

        loop {
            while self.pos < self.buf.len()
                && matches!(self.buf[self.pos], b' ' | b'\t' | b'\n' | b'\r')
            {
                self.pos += 1;
            }
            if self.pos >= self.buf.len() {
                return if self.expect == Expect::Done && self.end_of_input {
                    Ok(ReadStep::End)
                } else {
                    Ok(ReadStep::NeedMoreData)
                };
            }

            let byte = self.buf[self.pos];
            match self.expect {
                Expect::Done => {
                    return Err(self.syntax_here("trailing characters after the root value"));
                }
                Expect::Colon => {
                    if byte == b':' {
                        self.pos += 1;
                        self.expect = Expect::Value;
                        continue;
                    }
                    return Err(self.syntax_here("expected ':' after member name"));
                }
                Expect::SepOrEnd => match (byte, self.stack.last()) {
                    (b',', Some(Scope::Object)) => {
                        self.pos += 1;
                        self.expect = Expect::Name;
                        continue;
                    }
                    (b',', Some(Scope::Array)) => {
                        self.pos += 1;
                        self.expect = Expect::Value;
                        continue;
                    }
                    (b'}', Some(Scope::Object)) => return self.close(JsonToken::EndObject),
                    (b']', Some(Scope::Array)) => return self.close(JsonToken::EndArray),
                    _ => {
                        return Err(self.syntax_here("expected ',' or a closing bracket"));
                    }
                },
                Expect::Name | Expect::NameOrEnd => {
                    if byte == b'}' && self.expect == Expect::NameOrEnd {
                        return self.close(JsonToken::EndObject);
                    }
                    if byte != b'"' {
                        return Err(self.syntax_here("expected a quoted member name"));
                    }
                    return match self.lex_string()? {
                        Some(name) => {
                            self.expect = Expect::Colon;
                            Ok(ReadStep::Token(JsonToken::PropertyName(name)))
                        }
                        None => Ok(ReadStep::NeedMoreData),
                    };
                }
                Expect::Value | Expect::ValueOrEnd => {
                    if byte == b']' && self.expect == Expect::ValueOrEnd {
                        return self.close(JsonToken::EndArray);
                    }
                    return self.lex_value(byte);
                }
            }
        }
    }

    fn lex_value(&mut self, byte: u8) -> Result<ReadStep> {
        match byte {
            b'{' => {
                self.pos += 1;
                self.stack.push(Scope::Object);
                self.expect = Expect::NameOrEnd;
                Ok(ReadStep::Token(JsonToken::StartObject))
            }
            b'[' => {
                self.pos += 1;
                self.stack.push(Scope::Array);
                self.expect = Expect::ValueOrEnd;
                Ok(ReadStep::Token(JsonToken::StartArray))
            }
            b'"' => match self.lex_string()? {
                Some(text) => {
                    self.after_value();
                    Ok(ReadStep::Token(JsonToken::String(text)))
                }
                None => Ok(ReadStep::NeedMoreData),
            },
            b't' => self.lex_literal(b"true", JsonToken::Bool(true)),
            b'f' => self.lex_literal(b"false", JsonToken::Bool(false)),
            b'n' => self.lex_literal(b"null", JsonToken::Null),
            b'-' | b'0'..=b'9' => self.lex_number(),
            _ => Err(self.syntax_here("unexpected byte at start of value")),
        }
    }

    /// Pop a scope for a closing bracket and emit the matching token
    fn close(&mut self, token: JsonToken) -> Result<ReadStep> {
        self.pos += 1;
        self.stack.pop();
        self.after_value();
        Ok(ReadStep::Token(token))
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::SepOrEnd
        };
    }

    /// Lex a complete string starting at `self.pos` (which holds `"`).
    /// Returns `None` when the closing quote is not yet buffered.
    fn lex_string(&mut self) -> Result<Option<String>> {
        let start = self.pos;
        let mut i = start + 1;
        let mut text = String::new();
        while i < self.buf.len() {
            let byte = self.buf[i];
            match byte {
                b'"' => {
                    self.pos = i + 1;
                    return Ok(Some(text));
                }
                b'\\' => {
                    let Some(consumed) = self.decode_escape(i, &mut text)? else {
                        return Ok(None);
                    };
                    i += consumed;
                }
                0x00..=0x1f => {
                    return Err(self.syntax_at(i, "unescaped control character in string"));
                }
                _ => {
                    // Copy one UTF-8 scalar, validating as we go
                    let width = utf8_width(byte)
                        .ok_or_else(|| self.syntax_at(i, "invalid UTF-8 in string"))?;
                    if i + width > self.buf.len() {
                        return Ok(None);
                    }
                    let scalar = std::str::from_utf8(&self.buf[i..i + width])
                        .map_err(|_| self.syntax_at(i, "invalid UTF-8 in string"))?;
                    text.push_str(scalar);
                    i += width;
                }
            }
        }
        Ok(None)
    }

    /// Decode one escape sequence beginning at `i` (which holds `\`).
    /// Returns the number of bytes consumed, or `None` when incomplete.
    fn decode_escape(&self, i: usize, text: &mut String) -> Result<Option<usize>> {
        let Some(&kind) = self.buf.get(i + 1) else {
            return Ok(None);
        };
        match kind {
            b'"' => text.push('"'),
            b'\\' => text.push('\\'),
            b'/' => text.push('/'),
            b'b' => text.push('\u{0008}'),
            b'f' => text.push('\u{000C}'),
            b'n' => text.push('\n'),
            b'r' => text.push('\r'),
            b't' => text.push('\t'),
            b'u' => {
                let Some(high) = self.hex4(i + 2)? else {
                    return Ok(None);
                };
                if (0xD800..=0xDBFF).contains(&high) {
                    // Surrogate pair: require the low half immediately
                    match (self.buf.get(i + 6), self.buf.get(i + 7)) {
                        (Some(b'\\'), Some(b'u')) => {}
                        (None, _) | (_, None) => return Ok(None),
                        _ => {
                            return Err(self.syntax_at(i, "unpaired surrogate in \\u escape"));
                        }
                    }
                    let Some(low) = self.hex4(i + 8)? else {
                        return Ok(None);
                    };
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(self.syntax_at(i, "unpaired surrogate in \\u escape"));
                    }
                    let scalar =
                        0x10000 + (((high - 0xD800) as u32) << 10) + (low - 0xDC00) as u32;
                    let ch = char::from_u32(scalar)
                        .ok_or_else(|| self.syntax_at(i, "invalid \\u escape"))?;
                    text.push(ch);
                    return Ok(Some(12));
                }
                if (0xDC00..=0xDFFF).contains(&high) {
                    return Err(self.syntax_at(i, "unpaired surrogate in \\u escape"));
                }
                let ch = char::from_u32(high as u32)
                    .ok_or_else(|| self.syntax_at(i, "invalid \\u escape"))?;
                text.push(ch);
                return Ok(Some(6));
            }
            _ => return Err(self.syntax_at(i, "invalid escape sequence")),
        }
        Ok(Some(2))
    }

    /// Read four hex digits at `at`; `None` when not fully buffered
    fn hex4(&self, at: usize) -> Result<Option<u16>> {
        if at + 4 > self.buf.len() {
            return Ok(None);
        }
        let mut value: u16 = 0;
        for offset in 0..4 {
            let byte = self.buf[at + offset];
            let digit = match byte {
                b'0'..=b'9' => byte - b'0',
                b'a'..=b'f' => byte - b'a' + 10,
                b'A'..=b'F' => byte - b'A' + 10,
                _ => return Err(self.syntax_at(at, "invalid \\u escape")),
            };
            value = (value << 4) | u16::from(digit);
        }
        Ok(Some(value))
    }

    fn lex_literal(&mut self, word: &'static [u8], token: JsonToken) -> Result<ReadStep> {
        let end = self.pos + word.len();
        let available = &self.buf[self.pos..self.buf.len().min(end)];
        if available != &word[..available.len()] {
            return Err(self.syntax_here("unexpected byte at start of value"));
        }
        if available.len() < word.len() {
            return if self.end_of_input {
                Err(self.syntax_here("unexpected end of input in literal"))
            } else {
                Ok(ReadStep::NeedMoreData)
            };
        }
        self.pos = end;
        self.after_value();
        Ok(ReadStep::Token(token))
    }

    fn lex_number(&mut self) -> Result<ReadStep> {
        let start = self.pos;
        let mut end = start;
        while end < self.buf.len() && is_number_byte(self.buf[end]) {
            end += 1;
        }
        if end == self.buf.len() && !self.end_of_input {
            // More digits may follow in the next chunk
            return Ok(ReadStep::NeedMoreData);
        }
        let text = std::str::from_utf8(&self.buf[start..end])
            .map_err(|_| self.syntax_here("invalid number"))?;
        if !is_valid_json_number(text) {
            return Err(self.syntax_here("invalid number"));
        }
        let number = parse_number(text).ok_or_else(|| self.syntax_here("invalid number"))?;
        self.pos = end;
        self.after_value();
        Ok(ReadStep::Token(JsonToken::Number(number)))
    }

    fn syntax_here(&self, message: &str) -> Error {
        self.syntax_at(self.pos, message)
    }

    fn syntax_at(&self, at: usize, message: &str) -> Error {
        Error::syntax(format!("{message} (offset {})", self.consumed + at as u64))
    }
}

#[inline]
fn is_number_byte(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
}

/// Validate against the JSON number grammar, which is stricter than Rust's
/// float parser (no leading zeros, no trailing dot, no bare minus)
fn is_valid_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    // Integer part
    match bytes.get(i) {
        Some(b'0') => {
            i += 1;
            if matches!(bytes.get(i), Some(b'0'..=b'9')) {
                return false;
            }
        }
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    // Fraction
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return false;
        }
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }
    // Exponent
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return false;
        }
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }
    i == bytes.len()
}

fn parse_number(text: &str) -> Option<Number> {
    if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return text.parse::<f64>().ok().and_then(Number::from_f64);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::PosInt(u));
    }
    // Out of 64-bit range; keep the magnitude as a float
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

#[inline]
fn utf8_width(byte: u8) -> Option<usize> {
    match byte {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}
