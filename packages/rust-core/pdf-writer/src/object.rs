//! PDF object model
//!
//! A tagged value type covering every primitive the PDF grammar allows in a
//! dictionary or array position, plus the sorted-key dictionary the
//! serializer relies on for deterministic output.

use std::collections::BTreeMap;
use std::fmt;

/// The identifier of an indirect object.
///
/// Generation numbers are always zero in files this crate writes (there are
/// no incremental updates), so only the object number is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 0 R", self.0)
    }
}

/// A PDF value.
///
/// `Name` and the two string kinds are distinct on purpose: names are
/// interned symbols (`/Font`), literal strings are parenthesized text, and
/// `HexBytes` are raw bytes emitted between angle brackets.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(String),
    LiteralString(Vec<u8>),
    HexBytes(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Reference(ObjectId),
}

impl Object {
    /// Literal string from text (escaping happens at emit time).
    pub fn string_literal(text: impl Into<String>) -> Object {
        Object::LiteralString(text.into().into_bytes())
    }

    /// Name without the leading slash.
    pub fn name(name: impl Into<String>) -> Object {
        Object::Name(name.into())
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Object::Integer(value as i64)
    }
}

impl From<usize> for Object {
    fn from(value: usize) -> Self {
        Object::Integer(value as i64)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Real(value)
    }
}

/// Bare string literals become names; this matches how dictionaries are
/// overwhelmingly written (`"Type" => "Page"`). Text values go through
/// [`Object::string_literal`].
impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::Name(value.to_string())
    }
}

impl From<ObjectId> for Object {
    fn from(value: ObjectId) -> Self {
        Object::Reference(value)
    }
}

impl From<Vec<Object>> for Object {
    fn from(value: Vec<Object>) -> Self {
        Object::Array(value)
    }
}

impl From<Dictionary> for Object {
    fn from(value: Dictionary) -> Self {
        Object::Dictionary(value)
    }
}

/// A PDF dictionary with keys held sorted.
///
/// Sorted keys make two identically-driven documents byte-identical, which
/// the test suite depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary(BTreeMap<String, Object>);

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Object)> {
        self.0.iter_mut()
    }
}

/// Builds a [`Dictionary`] from `"Key" => value` pairs.
///
/// Values go through `Into<Object>`, so names, integers, references, and
/// nested dictionaries all read naturally:
///
/// ```
/// use pdf_writer::{dict, Object};
///
/// let font = dict! {
///     "Type" => "Font",
///     "Subtype" => "Type1",
///     "BaseFont" => "Helvetica",
/// };
/// assert_eq!(font.get("Subtype"), Some(&Object::Name("Type1".into())));
/// ```
#[macro_export]
macro_rules! dict {
    () => { $crate::Dictionary::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut dict = $crate::Dictionary::new();
        $(dict.set($key, $value);)+
        dict
    }};
}

/// Formats a number the way PDF readers expect: plain decimal, no
/// exponent, at most six fractional digits, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let mut text = format!("{:.6}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId(7).to_string(), "7 0 R");
    }

    #[test]
    fn test_dictionary_keys_sorted() {
        let mut dict = Dictionary::new();
        dict.set("Zebra", 1i64);
        dict.set("Alpha", 2i64);
        dict.set("Mango", 3i64);

        let keys: Vec<&str> = dict.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Alpha", "Mango", "Zebra"]);
    }

    #[test]
    fn test_dict_macro_conversions() {
        let dict = dict! {
            "Type" => "Catalog",
            "Count" => 3i64,
            "Pages" => ObjectId(4),
        };

        assert_eq!(dict.get("Type"), Some(&Object::Name("Catalog".into())));
        assert_eq!(dict.get("Count"), Some(&Object::Integer(3)));
        assert_eq!(dict.get("Pages"), Some(&Object::Reference(ObjectId(4))));
    }

    #[test]
    fn test_string_literal_is_not_a_name() {
        let literal = Object::string_literal("Adobe");
        assert_eq!(literal, Object::LiteralString(b"Adobe".to_vec()));
        assert_ne!(literal, Object::Name("Adobe".into()));
    }

    #[test]
    fn test_format_number_integers() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
    }

    #[test]
    fn test_format_number_trims_trailing_zeros() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(format_number(72.125), "72.125");
    }

    #[test]
    fn test_format_number_six_fraction_digits() {
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert!(!format_number(595.2756).contains('e'));
    }
}
