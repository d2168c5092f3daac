//! Permissive decoder for the literal syntax the enrichment exports wrote into
//! CSV cells: single- or double-quoted strings, `None`/`True`/`False`, tuples,
//! sets and trailing commas. Any strict JSON document is also accepted.

use serde_json::{Map, Number, Value};

const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Decodes the whole of `text` (surrounding whitespace allowed). Never panics.
pub fn decode(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(text);
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: &'static str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0c') = self.peek() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'[') => self.nested(|p| p.list()),
            Some(b'(') => self.nested(|p| p.tuple()),
            Some(b'{') => self.nested(|p| p.braces()),
            Some(b'\'' | b'"') => self.strings(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.') => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                if self.string_prefix_len().is_some() {
                    self.strings()
                } else {
                    self.word()
                }
            }
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Items up to `close`, comma separated, trailing comma allowed.
    fn items(&mut self, close: u8) -> Result<Vec<Value>, LiteralError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(out);
            }
            out.push(self.value()?);
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            if self.eat(close) {
                return Ok(out);
            }
            return Err(self.error("expected ',' or closing bracket"));
        }
    }

    fn list(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        Ok(Value::Array(self.items(b']')?))
    }

    // `(x)` is just a parenthesised value; `(x,)` and `()` are tuples.
    fn tuple(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        self.skip_ws();
        if self.eat(b')') {
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        self.skip_ws();
        if self.eat(b')') {
            return Ok(first);
        }
        if !self.eat(b',') {
            return Err(self.error("expected ',' or ')'"));
        }
        let mut rest = self.items(b')')?;
        rest.insert(0, first);
        Ok(Value::Array(rest))
    }

    // `{}` is an empty mapping; `{a, b}` is a set, kept as a sequence.
    fn braces(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        self.skip_ws();
        if self.eat(b'}') {
            return Ok(Value::Object(Map::new()));
        }
        let first = self.value()?;
        if first.is_array() || first.is_object() {
            return Err(self.error("unhashable key or set member"));
        }
        self.skip_ws();
        if self.peek() != Some(b':') {
            if self.eat(b'}') {
                return Ok(Value::Array(vec![first]));
            }
            if !self.eat(b',') {
                return Err(self.error("expected ',', ':' or '}'"));
            }
            let mut rest = self.items(b'}')?;
            rest.insert(0, first);
            return Ok(Value::Array(rest));
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            self.skip_ws();
            if !self.eat(b':') {
                return Err(self.error("expected ':'"));
            }
            self.skip_ws();
            let value = self.value()?;
            map.insert(key_text(key), value);
            self.skip_ws();
            if self.eat(b'}') {
                return Ok(Value::Object(map));
            }
            if !self.eat(b',') {
                return Err(self.error("expected ',' or '}'"));
            }
            self.skip_ws();
            if self.eat(b'}') {
                return Ok(Value::Object(map));
            }
            key = self.value()?;
            if key.is_array() || key.is_object() {
                return Err(self.error("unhashable key"));
            }
            self.skip_ws();
        }
    }

    fn word(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "None" | "null" => Ok(Value::Null),
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.error("unknown identifier"))
            }
        }
    }

    /// Length of a string prefix such as `u`, `r` or `rb` when one starts here.
    fn string_prefix_len(&self) -> Option<usize> {
        let mut len = 0;
        while len < 2 {
            match self.peek_at(len) {
                Some(b'u' | b'U' | b'r' | b'R' | b'b' | b'B') => len += 1,
                Some(b'\'' | b'"') if len > 0 => return Some(len),
                _ => return None,
            }
        }
        match self.peek_at(len) {
            Some(b'\'' | b'"') => Some(len),
            _ => None,
        }
    }

    // Adjacent literals concatenate: `'a' "b"` is `"ab"`.
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut out = self.string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            let starts_string = matches!(self.peek(), Some(b'\'' | b'"'))
                || self.string_prefix_len().is_some();
            if !starts_string {
                self.pos = save;
                return Ok(Value::String(out));
            }
            out.push_str(&self.string()?);
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let prefix = self.string_prefix_len().unwrap_or(0);
        let raw = self.bytes[self.pos..self.pos + prefix]
            .iter()
            .any(|b| b.eq_ignore_ascii_case(&b'r'));
        self.pos += prefix;

        let quote = self.peek().ok_or_else(|| self.error("expected quote"))?;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut out = String::new();
        loop {
            let Some(c) = self.src[self.pos..].chars().next() else {
                return Err(self.error("unterminated string"));
            };
            if c as u32 == quote as u32 {
                if !triple {
                    self.pos += 1;
                    return Ok(out);
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.pos += 3;
                    return Ok(out);
                }
            }
            if c == '\n' && !triple {
                return Err(self.error("newline in string"));
            }
            if c == '\\' {
                if raw {
                    // Raw strings keep the backslash but it still shields the quote.
                    out.push('\\');
                    self.pos += 1;
                    if let Some(next) = self.src[self.pos..].chars().next() {
                        out.push(next);
                        self.pos += next.len_utf8();
                    }
                    continue;
                }
                self.escape(&mut out)?;
                continue;
            }
            out.push(c);
            self.pos += c.len_utf8();
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        self.pos += 1;
        let Some(c) = self.src[self.pos..].chars().next() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += c.len_utf8();
        match c {
            '\n' => {}
            '\\' | '\'' | '"' | '/' => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'a' => out.push('\x07'),
            'x' => {
                let code = self.hex(2)?;
                out.push(char::from_u32(code).ok_or_else(|| self.error("bad \\x escape"))?);
            }
            'u' => {
                let code = self.hex(4)?;
                out.push(self.utf16_unit(code)?);
            }
            'U' => {
                let code = self.hex(8)?;
                out.push(char::from_u32(code).ok_or_else(|| self.error("bad \\U escape"))?);
            }
            '0'..='7' => {
                let mut code = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            code = code * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(code).ok_or_else(|| self.error("bad octal escape"))?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    /// Resolves a `\u` code unit, pairing a high surrogate with a following `\uDC00..`.
    fn utf16_unit(&mut self, code: u32) -> Result<char, LiteralError> {
        if !(0xD800..0xDC00).contains(&code) {
            return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        if self.peek() == Some(b'\\') && self.peek_at(1) == Some(b'u') {
            let save = self.pos;
            self.pos += 2;
            let low = self.hex(4)?;
            if (0xDC00..0xE000).contains(&low) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            self.pos = save;
        }
        Ok(char::REPLACEMENT_CHARACTER)
    }

    fn hex(&mut self, digits: usize) -> Result<u32, LiteralError> {
        let end = self.pos + digits;
        let text = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated hex escape"))?;
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.error("bad hex escape"));
        }
        let code = u32::from_str_radix(text, 16).map_err(|_| self.error("bad hex escape"))?;
        self.pos = end;
        Ok(code)
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut negative = false;
        while let Some(sign @ (b'-' | b'+')) = self.peek() {
            negative ^= sign == b'-';
            self.pos += 1;
            self.skip_ws();
        }

        if self.peek() == Some(b'0') {
            let radix = match self.peek_at(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'o' | b'O') => Some(8),
                Some(b'b' | b'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits = self.take_while(|b| b.is_ascii_hexdigit() || b == b'_');
                let digits = digits.replace('_', "");
                let magnitude = i64::from_str_radix(&digits, radix)
                    .map_err(|_| self.error("bad integer literal"))?;
                return Ok(Value::Number(Number::from(if negative {
                    -magnitude
                } else {
                    magnitude
                })));
            }
        }

        let int_part = self.take_while(|b| b.is_ascii_digit() || b == b'_');
        let mut is_float = false;
        let mut frac_part = String::new();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            is_float = true;
            frac_part = self.take_while(|b| b.is_ascii_digit() || b == b'_');
        }
        if int_part.is_empty() && frac_part.is_empty() {
            self.pos = start;
            return Err(self.error("expected digits"));
        }
        let mut exponent = String::new();
        if let Some(b'e' | b'E') = self.peek() {
            let save = self.pos;
            self.pos += 1;
            let mut sign = String::new();
            if let Some(s @ (b'-' | b'+')) = self.peek() {
                sign.push(s as char);
                self.pos += 1;
            }
            let digits = self.take_while(|b| b.is_ascii_digit());
            if digits.is_empty() {
                self.pos = save;
                return Err(self.error("bad exponent"));
            }
            is_float = true;
            exponent = format!("e{sign}{digits}");
        }

        let int_part = int_part.replace('_', "");
        let frac_part = frac_part.replace('_', "");
        let sign = if negative { "-" } else { "" };

        if !is_float {
            if int_part.len() > 1 && int_part.bytes().any(|b| b != b'0') && int_part.starts_with('0')
            {
                return Err(self.error("leading zeros in integer"));
            }
            let text = format!("{sign}{int_part}");
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            if let Ok(n) = text.parse::<u64>() {
                return Ok(Value::Number(n.into()));
            }
        }

        let int_part = if int_part.is_empty() { "0" } else { &int_part };
        let frac_part = if frac_part.is_empty() { "0" } else { &frac_part };
        let text = format!("{sign}{int_part}.{frac_part}{exponent}");
        let f: f64 = text.parse().map_err(|_| self.error("bad float literal"))?;
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| self.error("non-finite number"))
    }

    fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !keep(b) {
                break;
            }
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
