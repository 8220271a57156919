//! Error types.
use std::fmt::Display;

use oxplot_serialize::{error::PrinterError, xmlwriter};

/// An error raised by a collaborator, such as a font engine or formula parser.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error while building or writing a document.
#[derive(Debug)]
pub enum Error {
    /// An element was constructed without a parent to attach to.
    MissingParent {
        /// The tag of the element being constructed
        tag: String,
    },
    /// An element was constructed with a parent from a different document.
    ForeignParent {
        /// The tag of the element being constructed
        tag: String,
    },
    /// A tag or attribute name is not a valid markup name.
    InvalidElement {
        /// The rejected name
        name: String,
        /// Why the name was rejected
        reason: &'static str,
    },
    /// An attribute value could not be interpreted where a specific kind of value is required.
    InvalidValue {
        /// The name of the attribute
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// An attribute value could not be normalized to text while writing.
    Serialization {
        /// The tag of the element holding the attribute
        element: String,
        /// The name of the attribute
        attribute: String,
        /// The underlying printing error
        source: PrinterError,
    },
    /// The markup writer was used incorrectly.
    Writer(xmlwriter::Error),
    /// The output sink rejected the document.
    Sink(std::io::Error),
    /// The font engine failed to produce glyphs.
    Font(BoxError),
    /// The formula engine failed to parse or render a formula.
    Formula(BoxError),
}

impl From<xmlwriter::Error> for Error {
    fn from(value: xmlwriter::Error) -> Self {
        Self::Writer(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParent { tag } => {
                write!(f, "cannot create `<{tag}>` without a parent element")
            }
            Self::ForeignParent { tag } => write!(
                f,
                "cannot create `<{tag}>` under a parent from another document"
            ),
            Self::InvalidElement { name, reason } => {
                write!(f, "`{name}` is not a valid markup name: {reason}")
            }
            Self::InvalidValue { name, reason } => {
                write!(f, "invalid value for `{name}`: {reason}")
            }
            Self::Serialization {
                element,
                attribute,
                source,
            } => write!(
                f,
                "cannot write `{attribute}` of `<{element}>`: {source}"
            ),
            Self::Writer(err) => err.fmt(f),
            Self::Sink(err) => write!(f, "failed to write document: {err}"),
            Self::Font(err) => write!(f, "font engine error: {err}"),
            Self::Formula(err) => write!(f, "formula engine error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization { source, .. } => Some(source),
            Self::Writer(err) => Some(err),
            Self::Sink(err) => Some(err),
            Self::Font(err) | Self::Formula(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
