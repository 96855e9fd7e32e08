//! Typed signal values
//!
//! The engine prints values as bit-vector literals (`'b0101`, `8'hff`) or as
//! aggregate records (`((valid => 'b1, data => 'hxx))`). They are decoded
//! into a [`Value`] and rendered for display; the driver attaches no hardware
//! meaning to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded signal value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Anything that is not a recognised literal, kept verbatim
    Scalar(String),
    /// Bits, most significant first; may contain `x` and `z`
    BitVector(String),
    /// Named fields in engine order
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Decode one line of `get` output
    pub fn decode(text: &str) -> Self {
        let mut parser = Parser::new(text.trim());
        match parser.value() {
            Some(value) if parser.at_end() => value,
            _ => Value::Scalar(text.trim().to_string()),
        }
    }

    /// Whether every bit is a known 0 or 1
    pub fn is_known(&self) -> bool {
        match self {
            Value::Scalar(_) => true,
            Value::BitVector(bits) => bits.chars().all(|c| c == '0' || c == '1'),
            Value::Struct(fields) => fields.iter().all(|(_, v)| v.is_known()),
        }
    }

    /// Numeric value of a fully known bit vector that fits in 128 bits
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::BitVector(bits) if self.is_known() => {
                match bits.trim_start_matches('0') {
                    "" => Some(0),
                    significant => u128::from_str_radix(significant, 2).ok(),
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(text) => f.write_str(text),
            Value::BitVector(bits) if self.is_known() => write!(f, "0x{}", bits_to_hex(bits)),
            Value::BitVector(bits) => f.write_str(bits),
            Value::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Lowercase hex for a string of 0/1 digits, without leading zeros
fn bits_to_hex(bits: &str) -> String {
    let pad = (4 - bits.len() % 4) % 4;
    let padded: Vec<u8> = std::iter::repeat(b'0')
        .take(pad)
        .chain(bits.bytes())
        .collect();

    let hex: String = padded
        .chunks(4)
        .map(|nibble| {
            let n = nibble
                .iter()
                .fold(0u32, |acc, &b| (acc << 1) | u32::from(b == b'1'));
            char::from_digit(n, 16).unwrap_or('0')
        })
        .collect();

    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Expand a based literal body into bits
fn expand_digits(base: char, digits: &str) -> Option<String> {
    let bits_per_digit = match base {
        'b' => 1,
        'o' => 3,
        'h' => 4,
        _ => return None,
    };

    let mut bits = String::with_capacity(digits.len() * bits_per_digit);
    for c in digits.chars().filter(|&c| c != '_') {
        match c.to_ascii_lowercase() {
            c @ ('x' | 'z') => bits.extend(std::iter::repeat(c).take(bits_per_digit)),
            c => {
                let n = c.to_digit(1 << bits_per_digit)?;
                for shift in (0..bits_per_digit).rev() {
                    bits.push(if (n >> shift) & 1 == 1 { '1' } else { '0' });
                }
            }
        }
    }

    (!bits.is_empty()).then_some(bits)
}

/// Decode `[width]'[s]<base><digits>`
fn decode_literal(text: &str) -> Option<Value> {
    let (width, rest) = text.split_once('\'')?;
    if !width.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let rest = rest.strip_prefix(['s', 'S']).unwrap_or(rest);
    let mut chars = rest.chars();
    let base = chars.next()?.to_ascii_lowercase();
    let digits = chars.as_str();

    if base == 'd' {
        return Some(Value::Scalar(text.to_string()));
    }
    expand_digits(base, digits).map(Value::BitVector)
}

/// Recursive-descent parser for the value grammar
///
/// ```text
/// value  := record | atom
/// record := "((" [field ("," field)*] "))"
/// field  := name "=>" value
/// ```
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.input.len()
    }

    fn value(&mut self) -> Option<Value> {
        if self.eat("((") {
            return self.record();
        }

        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c == ',' || c == ')')
            .unwrap_or(rest.len());
        let atom = rest[..end].trim();
        self.pos += end;

        if atom.is_empty() {
            return None;
        }
        Some(decode_literal(atom).unwrap_or_else(|| Value::Scalar(atom.to_string())))
    }

    fn record(&mut self) -> Option<Value> {
        let mut fields = Vec::new();
        if self.eat("))") {
            return Some(Value::Struct(fields));
        }

        loop {
            self.skip_ws();
            let rest = self.rest();
            let arrow = rest.find("=>")?;
            let name = rest[..arrow].trim();
            if name.is_empty() || name.contains([',', '(', ')']) {
                return None;
            }
            self.pos += arrow + 2;

            let value = self.value()?;
            fields.push((name.to_string(), value));

            if self.eat(",") {
                continue;
            }
            if self.eat("))") {
                return Some(Value::Struct(fields));
            }
            return None;
        }
    }
}
