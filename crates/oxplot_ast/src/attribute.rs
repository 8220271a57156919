//! Attribute values, the attribute list of a node, and the options used to construct elements.
use std::borrow::Cow;

use oxplot_serialize::{error::PrinterError, ToValue};

use crate::{error::Error, name::QualName, node::Ref};

/// Keys used to wire an element into the tree, which are never written as attributes.
pub const RESERVED_KEYS: [&str; 2] = ["parent", "root"];

#[derive(Debug, Clone, PartialEq)]
/// The value of an attribute, which is only converted to text when a document is written.
pub enum Value {
    /// A text value, written as-is
    Text(String),
    /// An integer, written in decimal
    Integer(i64),
    /// A number, written in its shortest round-trip form
    Number(f64),
    /// A sequence of values, written seperated by `", "`
    List(Vec<Value>),
}

impl Value {
    /// Returns the value as a number, parsing text when needed
    pub fn as_number(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(n) => Some(*n as f64),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::List(_) => None,
        }
    }

    /// Returns the value as text, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl ToValue for Value {
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: std::fmt::Write,
    {
        match self {
            Self::Text(s) => s.write_value(dest),
            Self::Integer(n) => n.write_value(dest),
            Self::Number(n) => n.write_value(dest),
            Self::List(items) => {
                if items.iter().any(|item| matches!(item, Self::List(_))) {
                    return Err(PrinterError::NestedSequence);
                }
                items.as_slice().write_value(dest)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! from_integer {
    ($($int:ty),*) => {
        $(impl From<$int> for Value {
            fn from(value: $int) -> Self {
                Self::Integer(i64::from(value))
            }
        })*
    };
}
from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Self::List(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::List(vec![a.into(), b.into(), c.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>, D: Into<Value>> From<(A, B, C, D)> for Value {
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Self::List(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The attribute of an element's attributes.
pub struct Attribute {
    /// The name of an attribute (e.g. `foo` of `foo="bar"`)
    pub name: QualName,
    /// The value of an attribute (e.g. `"bar"` of `foo="bar"`)
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// The ordered list of attributes of an element, where each name appears once.
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// Creates an empty attribute list
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the named attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|attr| attr.name.matches(name))
            .map(|attr| &attr.value)
    }

    /// Returns whether the named attribute is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets the value of an attribute, returning the previous value.
    ///
    /// An existing attribute keeps its position; a new attribute is added to the end.
    pub fn insert(&mut self, name: QualName, value: Value) -> Option<Value> {
        if let Some(attr) = self.0.iter_mut().find(|attr| attr.name == name) {
            return Some(std::mem::replace(&mut attr.value, value));
        }
        self.0.push(Attribute { name, value });
        None
    }

    /// Removes the named attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.0.iter().position(|attr| attr.name.matches(name))?;
        Some(self.0.remove(index).value)
    }

    /// Returns an iterator over the attributes in order
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    /// Returns the number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Attribute> for Attributes {
    fn extend<T: IntoIterator<Item = Attribute>>(&mut self, iter: T) {
        for Attribute { name, value } in iter {
            self.insert(name, value);
        }
    }
}

impl IntoIterator for Attributes {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Converts a semantic option key into a markup attribute name, replacing each `_` with `-`.
///
/// ```
/// assert_eq!(oxplot_ast::attribute::mangle("stroke_width"), "stroke-width");
/// assert_eq!(oxplot_ast::attribute::mangle("xlink:href"), "xlink:href");
/// ```
pub fn mangle(key: &str) -> Cow<'_, str> {
    if key.contains('_') {
        Cow::Owned(key.replace('_', "-"))
    } else {
        Cow::Borrowed(key)
    }
}

/// Converts semantic options into an attribute list.
///
/// Keys are mangled, reserved wiring keys are dropped, and a repeated name replaces the value
/// of the earlier one in place.
///
/// # Errors
/// When a mangled key is not a valid markup name
pub fn normalize(options: Vec<(String, Value)>) -> Result<Attributes, Error> {
    let mut attributes = Attributes::new();
    for (key, value) in options {
        let name = mangle(&key);
        if RESERVED_KEYS.contains(&name.as_ref()) {
            log::debug!("dropping reserved option `{name}`");
            continue;
        }
        attributes.insert(QualName::parse(&name)?, value);
    }
    Ok(attributes)
}

#[derive(Debug, Clone, Default)]
/// The arguments for constructing an element: semantic attributes plus the parent to attach to.
///
/// Use [`attrs!`](crate::attrs) to build options with identifier keys.
pub struct Options<'arena> {
    attributes: Vec<(String, Value)>,
    parent: Option<Ref<'arena>>,
}

impl<'arena> Options<'arena> {
    /// Creates empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a semantic attribute
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds a semantic attribute in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.push((key.into(), value.into()));
    }

    /// Sets the node the element will be attached to, overriding the container it's
    /// constructed from
    #[must_use]
    pub fn parent(mut self, parent: Ref<'arena>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the explicitly given parent, if any
    pub fn get_parent(&self) -> Option<Ref<'arena>> {
        self.parent
    }

    /// Returns whether an attribute would be written under the given markup name
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| mangle(key) == name)
    }

    /// Removes every attribute written under the given markup name, returning the last value
    pub fn take(&mut self, name: &str) -> Option<Value> {
        let mut result = None;
        self.attributes.retain_mut(|(key, value)| {
            if mangle(key) != name {
                return true;
            }
            result = Some(std::mem::replace(value, Value::List(vec![])));
            false
        });
        result
    }

    /// Adds a semantic attribute before all others
    #[must_use]
    pub(crate) fn prepend(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(0, (key.into(), value.into()));
        self
    }

    /// Uses the given parent unless one was given explicitly
    #[must_use]
    pub(crate) fn or_parent(mut self, parent: Ref<'arena>) -> Self {
        self.parent.get_or_insert(parent);
        self
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, Value)>, Option<Ref<'arena>>) {
        (self.attributes, self.parent)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Options<'_> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            parent: None,
        }
    }
}

/// Builds [`Options`] from `key: value` pairs, where each key is an identifier.
///
/// ```
/// use oxplot_ast::{attrs, attribute::Value};
///
/// let mut options = attrs! { x: 0, stroke_width: 5, fill: "red" };
/// assert_eq!(options.take("stroke-width"), Some(Value::Integer(5)));
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::attribute::Options::new()
    };
    ($($key:ident : $value:expr),+ $(,)?) => {
        $crate::attribute::Options::new()$(.with(stringify!($key), $value))+
    };
}

#[test]
fn mangle_replaces_every_underscore() {
    assert_eq!(mangle("stroke_width"), "stroke-width");
    assert_eq!(mangle("stop_color"), "stop-color");
    assert_eq!(mangle("a__b_"), "a--b-");
    assert!(matches!(mangle("fill"), Cow::Borrowed("fill")));
}

#[test]
fn normalize_mangles_and_drops_reserved() -> anyhow::Result<()> {
    let options = attrs! { fill: "red", stroke_width: 5, root: "ignored", parent: 1 };
    let (attributes, _) = options.into_parts();
    let attributes = normalize(attributes)?;

    let names: Vec<_> = attributes.iter().map(|a| a.name.to_string()).collect();
    assert_eq!(names, ["fill", "stroke-width"]);
    assert_eq!(attributes.get("stroke-width"), Some(&Value::Integer(5)));
    Ok(())
}

#[test]
fn normalize_replaces_duplicates_in_place() -> anyhow::Result<()> {
    let options = attrs! { stroke_width: 1, fill: "red" }.with("stroke-width", 2);
    let (attributes, _) = options.into_parts();
    let attributes = normalize(attributes)?;

    let pairs: Vec<_> = attributes
        .iter()
        .map(|a| (a.name.to_string(), a.value.clone()))
        .collect();
    assert_eq!(
        pairs,
        [
            (String::from("stroke-width"), Value::Integer(2)),
            (String::from("fill"), Value::from("red")),
        ]
    );
    Ok(())
}

#[test]
fn normalize_rejects_invalid_names() {
    let options = Options::new().with("fill color", "red");
    let (attributes, _) = options.into_parts();
    assert!(matches!(
        normalize(attributes),
        Err(Error::InvalidElement { .. })
    ));
}

#[test]
fn values_to_text() -> Result<(), PrinterError> {
    assert_eq!(Value::from(150).to_value_string()?, "150");
    assert_eq!(Value::from(0.25).to_value_string()?, "0.25");
    assert_eq!(Value::from((0, 0, 150, 150)).to_value_string()?, "0, 0, 150, 150");
    assert_eq!(Value::from(vec!["a", "b"]).to_value_string()?, "a, b");
    assert_eq!(
        Value::List(vec![Value::from((1, 2))]).to_value_string(),
        Err(PrinterError::NestedSequence)
    );
    assert!(matches!(
        Value::from(f64::NAN).to_value_string(),
        Err(PrinterError::NonFiniteNumber(n)) if n.is_nan()
    ));
    Ok(())
}

#[test]
fn options_take_uses_markup_names() {
    let mut options = attrs! { x: 1, stroke_width: 2 }.with("x", 3);
    assert_eq!(options.take("x"), Some(Value::Integer(3)));
    assert!(!options.contains("x"));
    assert!(options.contains("stroke-width"));
    assert_eq!(options.take("stroke-width"), Some(Value::Integer(2)));
    assert_eq!(options.take("y"), None);
}
