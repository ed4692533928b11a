//! Typed values for log fields and index keys.
//!
//! A field is written with `str` semantics (a bare string stays bare, everything else is rendered
//! as a literal) and index keys are read back with [`Literal::parse`], which accepts the literal
//! subset that the writer produces: `None`, booleans, integers, floats, quoted strings, tuples and
//! lists.

use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::LogError;

#[derive(Debug, Clone)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Literal>),
    List(Vec<Literal>),
}

impl Literal {
    /// Parses the textual literal form of a value, e.g. `(1, 'a')` or `[2.5, None]`.
    pub fn parse(text: &str) -> Result<Literal, LogError> {
        let mut parser = Parser::new(text);
        parser
            .document()
            .map_err(|reason| LogError::MalformedLiteral {
                text: text.to_string(),
                reason,
            })
    }

    /// The quoted literal form, the one [`Literal::parse`] reads back.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing into a String can't fail.
        let _ = self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut impl Write) -> fmt::Result {
        match self {
            Literal::None => out.write_str("None"),
            Literal::Bool(true) => out.write_str("True"),
            Literal::Bool(false) => out.write_str("False"),
            Literal::Int(value) => write!(out, "{}", value),
            Literal::Float(value) => write_float(out, *value),
            Literal::Str(value) => write_quoted(out, value),
            Literal::Tuple(items) => {
                out.write_char('(')?;
                write_items(out, items)?;
                if items.len() == 1 {
                    out.write_char(',')?;
                }
                out.write_char(')')
            }
            Literal::List(items) => {
                out.write_char('[')?;
                write_items(out, items)?;
                out.write_char(']')
            }
        }
    }
}

fn write_items(out: &mut impl Write, items: &[Literal]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        item.write_repr(out)?;
    }
    Ok(())
}

fn write_float(out: &mut impl Write, value: f64) -> fmt::Result {
    if value.is_nan() {
        out.write_str("nan")
    } else if value.is_infinite() {
        out.write_str(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        // Debug keeps the fractional part on integral values, `1.0` rather than `1`.
        write!(out, "{:?}", value)
    }
}

fn write_quoted(out: &mut impl Write, value: &str) -> fmt::Result {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    out.write_char(quote)?;
    for c in value.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c == quote => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            c if (c as u32) < 0x20 || c == '\x7f' => write!(out, "\\x{:02x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char(quote)
}

/// Field rendering: strings are written bare, every other value in its literal form.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(value) => f.write_str(value),
            other => other.write_repr(f),
        }
    }
}

impl FromStr for Literal {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Literal::parse(s)
    }
}

/// A numeric value the way keys compare: booleans count as 0 and 1, and a float equal to an
/// integer is that integer.
#[derive(PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(literal: &Literal) -> Option<Number> {
        match literal {
            Literal::Bool(value) => Some(Number::Int(i64::from(*value))),
            Literal::Int(value) => Some(Number::Int(*value)),
            Literal::Float(value) => Some(Number::from_float(*value)),
            _ => None,
        }
    }

    fn from_float(value: f64) -> Number {
        // 2^63 is the first float past i64::MAX.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) {
            Number::Int(value as i64)
        } else {
            Number::Float(value)
        }
    }

    fn same(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

// Numbers compare by value across `Bool`, `Int` and `Float`, so a key logged as `1.0` matches a
// task keyed `1`. Every NaN equals every other NaN to keep `Eq` reflexive.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (Number::of(self), Number::of(other)) {
            return a.same(&b);
        }

        match (self, other) {
            (Literal::None, Literal::None) => true,
            (Literal::Str(a), Literal::Str(b)) => a == b,
            (Literal::Tuple(a), Literal::Tuple(b)) => a == b,
            (Literal::List(a), Literal::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(number) = Number::of(self) {
            0u8.hash(state);
            match number {
                Number::Int(value) => value.hash(state),
                Number::Float(value) if value.is_nan() => f64::NAN.to_bits().hash(state),
                Number::Float(value) => value.to_bits().hash(state),
            }
            return;
        }

        std::mem::discriminant(self).hash(state);
        match self {
            Literal::Str(value) => value.hash(state),
            Literal::Tuple(items) | Literal::List(items) => items.hash(state),
            _ => {}
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(i64::from(value))
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Literal::Int(i64::from(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::None, Into::into)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(value: Vec<T>) -> Self {
        Literal::List(value.into_iter().map(Into::into).collect())
    }
}

macro_rules! tuple_literal {
    ($($name:ident),+) => {
        impl<$($name: Into<Literal>),+> From<($($name,)+)> for Literal {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Literal::Tuple(vec![$($name.into()),+])
            }
        }
    };
}

tuple_literal!(A);
tuple_literal!(A, B);
tuple_literal!(A, B, C);
tuple_literal!(A, B, C, D);

/// Deepest bracket nesting [`Literal::parse`] accepts.
pub const MAX_NESTING: usize = 100;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn document(&mut self) -> Result<Literal, String> {
        let value = self.value()?;
        self.skip_whitespace();
        match self.peek() {
            None => Ok(value),
            Some(c) => Err(format!("unexpected {:?} at offset {}", c, self.pos)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Result<Literal, String> {
        self.skip_whitespace();
        match self.peek() {
            None => Err("unexpected end of input".to_string()),
            Some('(') => {
                self.open()?;
                let value = self.tuple();
                self.depth -= 1;
                value
            }
            Some('[') => {
                self.open()?;
                let value = self.sequence(']').map(Literal::List);
                self.depth -= 1;
                value
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(quote).map(Literal::Str)
            }
            Some(c) if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(c) => Err(format!("unexpected {:?} at offset {}", c, self.pos)),
        }
    }

    fn open(&mut self) -> Result<(), String> {
        if self.depth == MAX_NESTING {
            return Err(format!(
                "nesting deeper than {} at offset {}",
                MAX_NESTING, self.pos
            ));
        }
        self.depth += 1;
        self.pos += 1;
        Ok(())
    }

    fn keyword(&mut self) -> Result<Literal, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            _ => Err(format!("'{}' is not a literal", word)),
        }
    }

    // After the opening parenthesis: `()`, `(x,)`, `(x, y)` are tuples, `(x)` is just `x`.
    fn tuple(&mut self) -> Result<Literal, String> {
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(Literal::Tuple(Vec::new()));
        }

        let first = self.value()?;
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(first);
        }
        if !self.eat(',') {
            return Err(format!("expected ',' or ')' at offset {}", self.pos));
        }

        let mut items = vec![first];
        items.extend(self.sequence(')')?);
        Ok(Literal::Tuple(items))
    }

    fn sequence(&mut self, close: char) -> Result<Vec<Literal>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(',') {
                return Err(format!("expected ',' or {:?} at offset {}", close, self.pos));
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".to_string()),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), String> {
        let c = self.bump().ok_or("unterminated escape sequence")?;
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' => out.push(self.code_point(2)?),
            'u' => out.push(self.code_point(4)?),
            'U' => out.push(self.code_point(8)?),
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).ok_or("invalid octal escape")?);
            }
            // Unknown escapes keep their backslash.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn code_point(&mut self, digits: usize) -> Result<char, String> {
        let end = self.pos + digits;
        let hex: String = self
            .chars
            .get(self.pos..end)
            .ok_or("truncated escape sequence")?
            .iter()
            .collect();
        let value = u32::from_str_radix(&hex, 16)
            .map_err(|_| format!("invalid escape digits '{}'", hex))?;
        self.pos = end;
        char::from_u32(value).ok_or_else(|| format!("invalid code point {:#x}", value))
    }

    fn number(&mut self) -> Result<Literal, String> {
        let negative = if self.eat('-') {
            true
        } else {
            self.eat('+');
            false
        };
        self.skip_whitespace();

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            // Exponent signs belong to the number, `1e-5`.
            let previous = self.peek();
            self.pos += 1;
            if matches!(previous, Some('e' | 'E')) && matches!(self.peek(), Some('+' | '-')) {
                let radix_prefixed = self
                    .chars
                    .get(start..start + 2)
                    .is_some_and(|p| p[0] == '0' && matches!(p[1], 'x' | 'X'));
                if !radix_prefixed {
                    self.pos += 1;
                }
            }
        }

        let token: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if token.is_empty() {
            return Err(format!("expected a number at offset {}", start));
        }

        let lower = token.to_ascii_lowercase();
        let radix = match lower.get(..2) {
            Some("0x") => Some(16),
            Some("0o") => Some(8),
            Some("0b") => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            let magnitude = i64::from_str_radix(&token[2..], radix)
                .map_err(|e| format!("invalid integer '{}': {}", token, e))?;
            return Ok(Literal::Int(if negative { -magnitude } else { magnitude }));
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            let signed = if negative {
                format!("-{}", token)
            } else {
                token.clone()
            };
            return signed
                .parse::<i64>()
                .map(Literal::Int)
                .map_err(|e| format!("invalid integer '{}': {}", token, e));
        }

        // Rust accepts `inf` and `nan` here, literals do not.
        if lower.contains("inf") || lower.contains("nan") {
            return Err(format!("'{}' is not a literal", token));
        }
        token
            .parse::<f64>()
            .map(|value| Literal::Float(if negative { -value } else { value }))
            .map_err(|e| format!("invalid number '{}': {}", token, e))
    }
}
