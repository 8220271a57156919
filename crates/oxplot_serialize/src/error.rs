//! Error types.
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
/// An error while printing a value as attribute text
pub enum PrinterError {
    /// The destination refused the formatted text
    Fmt(std::fmt::Error),
    /// A number that has no textual representation in markup, such as `NaN`
    NonFiniteNumber(f64),
    /// A sequence was found inside another sequence
    NestedSequence,
}

impl From<std::fmt::Error> for PrinterError {
    fn from(value: std::fmt::Error) -> Self {
        Self::Fmt(value)
    }
}

impl Display for PrinterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fmt(err) => err.fmt(f),
            Self::NonFiniteNumber(n) => write!(f, "the number `{n}` cannot be written as markup"),
            Self::NestedSequence => f.write_str("sequences cannot contain other sequences"),
        }
    }
}
impl std::error::Error for PrinterError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An unrecognised encoding label
pub struct UnknownEncoding(pub String);

impl Display for UnknownEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown encoding `{}`, expected `utf-8`, `us-ascii`, or `none`",
            self.0
        )
    }
}
impl std::error::Error for UnknownEncoding {}
