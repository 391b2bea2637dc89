//! Canonical parameter types and example value synthesis.
//!
//! Free-text type tokens written in annotations (`int`, `bool`, `string[]`, ...) are mapped onto
//! a small fixed set of [`CanonicalType`]s. The [`ValueSynthesizer`] produces a representative
//! example value for each of them; it is seedable so generated documentation is reproducible.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

/// The fixed set of types a documented parameter can have.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    Integer,
    Number,
    Float,
    Boolean,
    String,
    Array,
    Object,
    /// An array of elements of the inner type, written `T[]`
    ArrayOf(Box<CanonicalType>),
}

impl CanonicalType {
    /// Removes one array marker, if any
    pub fn element_type(&self) -> Option<&CanonicalType> {
        match self {
            CanonicalType::ArrayOf(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalType::Integer => write!(f, "integer"),
            CanonicalType::Number => write!(f, "number"),
            CanonicalType::Float => write!(f, "float"),
            CanonicalType::Boolean => write!(f, "boolean"),
            CanonicalType::String => write!(f, "string"),
            CanonicalType::Array => write!(f, "array"),
            CanonicalType::Object => write!(f, "object"),
            CanonicalType::ArrayOf(inner) => write!(f, "{}[]", inner),
        }
    }
}

impl Serialize for CanonicalType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps a free-text type token onto a [`CanonicalType`].
///
/// `int`, `bool` and `double` are aliases for `integer`, `boolean` and `float`. Each trailing
/// `[]` wraps the element type in [`CanonicalType::ArrayOf`]. An empty token means `string`, and
/// so does any token that is not recognized.
pub fn normalize_type(token: &str) -> CanonicalType {
    let token: String = token.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(inner) = token.strip_suffix("[]") {
        return CanonicalType::ArrayOf(Box::new(normalize_type(inner)));
    }

    match token.to_ascii_lowercase().as_str() {
        "" | "string" => CanonicalType::String,
        "int" | "integer" => CanonicalType::Integer,
        "number" => CanonicalType::Number,
        "float" | "double" => CanonicalType::Float,
        "bool" | "boolean" => CanonicalType::Boolean,
        "array" => CanonicalType::Array,
        "object" => CanonicalType::Object,
        other => {
            debug!("Unknown parameter type '{}', treating it as string", other);
            CanonicalType::String
        }
    }
}

const WORDS: &[&str] = &[
    "alias", "consequatur", "aut", "perferendis", "sit", "voluptatem", "accusantium", "doloremque",
    "aperiam", "eaque", "ipsa", "quae", "ab", "illo", "inventore", "veritatis", "et", "quasi",
    "architecto", "beatae", "vitae", "dicta", "sunt", "explicabo", "nemo", "enim", "ipsam",
    "quia", "voluptas", "aspernatur", "odit", "fugit", "sed", "consequuntur", "magni", "dolores",
    "eos", "qui", "ratione", "sequi", "nesciunt", "neque", "porro", "quisquam", "est", "dolorem",
    "ipsum", "dolor", "amet", "adipisci", "velit", "numquam", "eius", "modi", "tempora",
    "incidunt", "ut", "labore", "dolore", "magnam", "aliquam", "quaerat",
];

/// Produces example values for canonical types.
pub struct ValueSynthesizer {
    rng: StdRng,
}

impl ValueSynthesizer {
    /// Creates a synthesizer. With a seed the sequence of produced values is deterministic.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn synthesize(&mut self, ty: &CanonicalType) -> Value {
        match ty {
            CanonicalType::Integer => Value::from(self.rng.gen_range(1..=20i64)),
            CanonicalType::Number | CanonicalType::Float => {
                let raw: f64 = self.rng.gen_range(0.0..1000.0);
                let rounded = (raw * 100.0).round() / 100.0;
                Number::from_f64(rounded).map_or(Value::Null, Value::Number)
            }
            CanonicalType::Boolean => Value::Bool(self.rng.gen_bool(0.5)),
            CanonicalType::String => Value::String(self.word()),
            CanonicalType::Array => Value::Array(Vec::new()),
            CanonicalType::Object => Value::Object(Map::new()),
            CanonicalType::ArrayOf(inner) => Value::Array(vec![self.synthesize(inner)]),
        }
    }

    /// A single random lorem word
    pub fn word(&mut self) -> String {
        WORDS[self.rng.gen_range(0..WORDS.len())].to_string()
    }
}
