//! Parsing of hand-written example literals.
//!
//! Annotation authors write examples such as `[1, 2, 3]`, `[['a', 'b'], ['c']]` or
//! `['name' => 'Jane', 'age' => 30]`. These are tokenized (`[`, `]`, `,`, `=>`, quoted strings and
//! bare words), parsed by recursive descent into a [`Node`] tree, and then converted to JSON
//! values guided by the declared [`CanonicalType`]: every `[]` marker on the declared type
//! consumes one level of list nesting and scalar leaves are cast to the element type.
//!
//! Literals are hand-authored, so malformed input is handled best-effort and never rejected.

use crate::types::CanonicalType;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Open,
    Close,
    Comma,
    Arrow,
    Quoted(String),
    Bare(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'[' => {
                i += 1;
                TokenKind::Open
            }
            b']' => {
                i += 1;
                TokenKind::Close
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'=' if bytes.get(i + 1) == Some(&b'>') => {
                i += 2;
                TokenKind::Arrow
            }
            b'\'' | b'"' => {
                let quote = c;
                let mut value = String::new();
                let mut j = i + 1;
                let mut run_start = j;
                while j < bytes.len() && bytes[j] != quote {
                    if bytes[j] == b'\\' && bytes.get(j + 1) == Some(&quote) {
                        value.push_str(&text[run_start..j]);
                        run_start = j + 1;
                        j += 2;
                        continue;
                    }
                    j += 1;
                }
                value.push_str(&text[run_start..j.min(bytes.len())]);
                // unterminated quotes run to the end of input
                i = (j + 1).min(bytes.len());
                TokenKind::Quoted(value)
            }
            _ => {
                let mut j = i;
                while j < bytes.len() {
                    match bytes[j] {
                        b'[' | b']' | b',' => break,
                        b'=' if bytes.get(j + 1) == Some(&b'>') => break,
                        _ => j += 1,
                    }
                }
                i = j;
                TokenKind::Bare(text[start..j].trim().to_string())
            }
        };
        tokens.push(Token {
            kind,
            start,
            end: i,
        });
    }

    tokens
}

/// Untyped parse tree of a literal.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Scalar(String),
    List { entries: Vec<Entry>, raw: String },
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    key: Option<String>,
    value: Node,
}

impl Node {
    fn text(&self) -> &str {
        match self {
            Node::Scalar(text) => text,
            Node::List { raw, .. } => raw,
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn parse_value(&mut self) -> Node {
        match self.peek() {
            Some(TokenKind::Open) => {
                let start = self.tokens[self.pos].start;
                self.pos += 1;
                self.parse_list_body(start)
            }
            Some(TokenKind::Quoted(text)) | Some(TokenKind::Bare(text)) => {
                let node = Node::Scalar(text.clone());
                self.pos += 1;
                node
            }
            _ => Node::Scalar(String::new()),
        }
    }

    /// Parses list entries up to the matching `]` (or the end of input)
    fn parse_list_body(&mut self, start: usize) -> Node {
        let mut entries = Vec::new();
        let mut expecting_entry = false;
        let mut end = self.source.len();

        while let Some(kind) = self.peek().cloned() {
            match kind {
                TokenKind::Close => {
                    end = self.tokens[self.pos].end;
                    self.pos += 1;
                    break;
                }
                TokenKind::Comma => {
                    self.pos += 1;
                    if expecting_entry {
                        entries.push(Entry {
                            key: None,
                            value: Node::Scalar(String::new()),
                        });
                    }
                    expecting_entry = true;
                }
                TokenKind::Arrow => {
                    // a key-less `=> value`; drop the arrow and keep the value
                    self.pos += 1;
                }
                _ => {
                    entries.push(self.parse_entry());
                    expecting_entry = false;
                }
            }
        }

        Node::List {
            entries,
            raw: self.source[start..end].to_string(),
        }
    }

    fn parse_entry(&mut self) -> Entry {
        let first = self.parse_value();
        if self.peek() == Some(&TokenKind::Arrow) {
            self.pos += 1;
            let value = self.parse_value();
            Entry {
                key: Some(first.text().to_string()),
                value,
            }
        } else {
            Entry {
                key: None,
                value: first,
            }
        }
    }
}

/// Parses a literal written for a parameter of the declared type.
///
/// For `T[]` types the text is parsed as a list (the outer brackets may be omitted) and every
/// entry is converted with `T`. Lists whose entries are all positional become JSON arrays; as
/// soon as one entry has a `key =>` the list becomes an object and positional entries are keyed
/// by their 0-based position. For scalar types the text is cast directly.
pub fn parse_literal(declared: &CanonicalType, text: &str) -> Value {
    let mut parser = Parser::new(text);

    if declared.element_type().is_none() {
        return cast_to_type(text, declared);
    }
    let node = if parser.peek() == Some(&TokenKind::Open) {
        parser.parse_value()
    } else {
        parser.parse_list_body(0)
    };

    convert(&node, declared)
}

fn convert(node: &Node, ty: &CanonicalType) -> Value {
    let Some(element) = ty.element_type() else {
        // deeper nesting than declared collapses back to text
        return cast_to_type(node.text(), ty);
    };

    match node {
        Node::List { entries, .. } => build_collection(entries, element),
        Node::Scalar(text) if text.is_empty() => Value::Array(Vec::new()),
        Node::Scalar(_) => Value::Array(vec![convert(node, element)]),
    }
}

fn build_collection(entries: &[Entry], element: &CanonicalType) -> Value {
    if entries.iter().all(|entry| entry.key.is_none()) {
        return Value::Array(
            entries
                .iter()
                .map(|entry| convert(&entry.value, element))
                .collect(),
        );
    }

    let mut map = Map::new();
    for (index, entry) in entries.iter().enumerate() {
        let key = entry.key.clone().unwrap_or_else(|| index.to_string());
        map.insert(key, convert(&entry.value, element));
    }
    Value::Object(map)
}

/// Casts example text to the given type.
///
/// `"false"` cast to boolean is `false`; otherwise only `""` and `"0"` are falsy. Integers and
/// floats use the leading numeric prefix of the text (no prefix means zero). `array` and
/// `object` accept JSON, then the literal syntax, then fall back to the raw string.
pub fn cast_to_type(text: &str, ty: &CanonicalType) -> Value {
    let text = text.trim();

    match ty {
        CanonicalType::Integer => Value::from(leading_int(text)),
        CanonicalType::Number | CanonicalType::Float => Number::from_f64(leading_float(text))
            .map_or_else(|| Value::from(0), Value::Number),
        CanonicalType::Boolean => Value::Bool(!matches!(text, "" | "0" | "false")),
        CanonicalType::String => Value::String(text.to_string()),
        CanonicalType::ArrayOf(_) => parse_literal(ty, text),
        CanonicalType::Array | CanonicalType::Object => {
            if let Ok(value) = serde_json::from_str::<Value>(text) {
                if value.is_array() || value.is_object() {
                    return value;
                }
            }
            if text.starts_with('[') {
                let untyped = CanonicalType::ArrayOf(Box::new(CanonicalType::String));
                return parse_literal(&untyped, text);
            }
            Value::String(text.to_string())
        }
    }
}

fn leading_int(text: &str) -> i64 {
    let mut chars = text.chars().peekable();
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for c in chars {
        let Some(digit) = c.to_digit(10) else { break };
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
    }

    if negative {
        -value
    } else {
        value
    }
}

fn leading_float(text: &str) -> f64 {
    let prefix_len = text
        .char_indices()
        .take_while(|&(i, c)| match c {
            '0'..='9' | '.' | 'e' | 'E' => true,
            '-' | '+' => i == 0 || text[..i].ends_with(|p: char| p == 'e' || p == 'E'),
            _ => false,
        })
        .count();

    (1..=prefix_len)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Renders a value back into literal syntax, e.g. `['name' => 'Jane', 'tags' => ['a', 'b']]`.
///
/// Numbers and numeric strings are printed bare, other leaves single-quoted. Booleans print as
/// `'true'` and `'false'`, null as `''`.
pub fn print_literal(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(print_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{} => {}", quote(key), print_literal(value)))
                .collect();
            format!("[{}]", entries.join(", "))
        }
        Value::Number(number) => number.to_string(),
        Value::String(text) if is_numeric(text) => text.clone(),
        Value::String(text) => quote(text),
        Value::Bool(flag) => quote(&flag.to_string()),
        Value::Null => quote(""),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "\\'"))
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && text.parse::<f64>().is_ok()
}
