//! Mapping-literal parsing.
//!
//! Score log rows embed a stringified mapping of the form
//! `{4077=4077, 1264=[1, 2, 3]}` — brace-delimited, comma-separated
//! `key<sep>value` pairs where `<sep>` is `=` or `:` and a value is either a
//! single number or a bracketed list of numbers. The simulation writes these
//! by stringifying its in-memory score maps, so the text is semi-structured
//! at best and must be parsed defensively, never evaluated.

use thiserror::Error;

/// A value on the right-hand side of a mapping entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingValue {
    /// A single numeric score.
    Scalar(f64),
    /// A bracketed list of numeric scores.
    List(Vec<f64>),
}

impl MappingValue {
    /// Number of numeric values this entry contributes to a flattened sample.
    pub fn len(&self) -> usize {
        match self {
            MappingValue::Scalar(_) => 1,
            MappingValue::List(values) => values.len(),
        }
    }

    /// Append every numeric value to `sample`.
    pub fn flatten_into(&self, sample: &mut Vec<f64>) {
        match self {
            MappingValue::Scalar(v) => sample.push(*v),
            MappingValue::List(values) => sample.extend_from_slice(values),
        }
    }
}

/// The parsed form of one record: ordered key → value pairs.
///
/// Keys are kept as raw text (the logs use both integer ids and short names)
/// and entry order is preserved; only the values matter for statistics, but
/// the tally mode needs the keys too.
pub type ParsedMapping = Vec<(String, MappingValue)>;

/// A record's text could not be parsed as a mapping literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingParseError {
    /// The record is empty or all whitespace.
    #[error("empty record")]
    EmptyRecord,

    /// The input ended before the mapping was complete.
    #[error("unexpected end of input ({0})")]
    UnexpectedEnd(&'static str),

    /// An unexpected character where an entry or delimiter was required.
    #[error("unexpected character '{found}' at byte {offset}")]
    UnexpectedChar { found: char, offset: usize },

    /// An entry key was empty.
    #[error("empty key at byte {0}")]
    EmptyKey(usize),

    /// A value token was not a valid number.
    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),

    /// Content after the closing brace.
    #[error("trailing content after closing '}}'")]
    TrailingContent,
}

/// Normalize the key/value separator so the record conforms to one canonical
/// mapping syntax: every `=` becomes `:`.
///
/// The two observed log formats disagree on the separator (`Map.toString`
/// emits `=`, JSON-ish rows emit `:`); downstream parsing only ever sees the
/// colon form.
pub fn normalize_separators(record: &str) -> String {
    record.replace('=', ":")
}

/// Parse a normalized mapping literal.
///
/// Grammar, ignoring whitespace:
///
/// ```text
/// mapping ::= '{' [ entries ] '}' | entries
/// entries ::= entry (',' entry)*
/// entry   ::= key ':' value
/// value   ::= number | '[' [ number (',' number)* ] ']'
/// ```
///
/// Keys are any run of characters excluding structural ones (`:,{}[]`),
/// trimmed. An empty mapping `{}` is valid and contributes no values.
/// The brace-less form covers single-entry rows some logs emit without
/// the enclosing delimiters.
pub fn parse_mapping(text: &str) -> Result<ParsedMapping, MappingParseError> {
    let mut parser = Parser::new(text);
    parser.mapping()
}

/// Normalize then parse in one step.
pub fn parse_record(record: &str) -> Result<ParsedMapping, MappingParseError> {
    parse_mapping(&normalize_separators(record))
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn mapping(&mut self) -> Result<ParsedMapping, MappingParseError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(MappingParseError::EmptyRecord);
        }
        let braced = self.eat('{');

        let mut entries = ParsedMapping::new();
        self.skip_whitespace();
        if braced && self.eat('}') {
            return self.finish(entries);
        }

        loop {
            let entry = self.entry()?;
            entries.push(entry);

            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if braced {
                if self.eat('}') {
                    return self.finish(entries);
                }
                return match self.peek() {
                    Some(c) => Err(MappingParseError::UnexpectedChar {
                        found: c,
                        offset: self.pos,
                    }),
                    None => Err(MappingParseError::UnexpectedEnd("unclosed '{'")),
                };
            }
            // Brace-less form: the entries must run to the end of the input.
            return match self.peek() {
                Some(c) => Err(MappingParseError::UnexpectedChar {
                    found: c,
                    offset: self.pos,
                }),
                None => Ok(entries),
            };
        }
    }

    fn finish(&mut self, entries: ParsedMapping) -> Result<ParsedMapping, MappingParseError> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(MappingParseError::TrailingContent);
        }
        Ok(entries)
    }

    fn entry(&mut self) -> Result<(String, MappingValue), MappingParseError> {
        self.skip_whitespace();
        let key_start = self.pos;
        let key = self.take_while(|c| !matches!(c, ':' | ',' | '{' | '}' | '[' | ']'));
        let key = key.trim();
        if key.is_empty() {
            return Err(MappingParseError::EmptyKey(key_start));
        }

        self.skip_whitespace();
        if !self.eat(':') {
            return match self.peek() {
                Some(c) => Err(MappingParseError::UnexpectedChar {
                    found: c,
                    offset: self.pos,
                }),
                None => Err(MappingParseError::UnexpectedEnd("incomplete entry")),
            };
        }

        let value = self.value()?;
        Ok((key.to_string(), value))
    }

    fn value(&mut self) -> Result<MappingValue, MappingParseError> {
        self.skip_whitespace();
        if self.eat('[') {
            let mut values = Vec::new();
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(MappingValue::List(values));
            }
            loop {
                values.push(self.number()?);
                self.skip_whitespace();
                if self.eat(',') {
                    continue;
                }
                if self.eat(']') {
                    return Ok(MappingValue::List(values));
                }
                return match self.peek() {
                    Some(c) => Err(MappingParseError::UnexpectedChar {
                        found: c,
                        offset: self.pos,
                    }),
                    None => Err(MappingParseError::UnexpectedEnd("unclosed '['")),
                };
            }
        }
        Ok(MappingValue::Scalar(self.number()?))
    }

    fn number(&mut self) -> Result<f64, MappingParseError> {
        self.skip_whitespace();
        let token = self.take_while(|c| !matches!(c, ',' | ']' | '}' | ':' | '[' | '{'));
        let token = token.trim();
        if token.is_empty() {
            return match self.peek() {
                Some(c) => Err(MappingParseError::UnexpectedChar {
                    found: c,
                    offset: self.pos,
                }),
                None => Err(MappingParseError::UnexpectedEnd("incomplete entry")),
            };
        }
        // Accepts both integer and fractional literals, including scientific
        // notation the simulation emits for tiny centrality scores.
        token
            .parse::<f64>()
            .map_err(|_| MappingParseError::InvalidNumber(token.to_string()))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}
