/*!
A small streaming XML writer that writes markup into a `std::io::Write` implementation.

Based on the [xmlwriter](https://docs.rs/xmlwriter/latest/xmlwriter/index.html) crate, with
some modifications.

- Errors instead of panicking
- Element names are owned, so callers can stream names built from a tree snapshot
- Allows writing a verbatim document header (declaration and doctype)

### Example

```rust
use oxplot_serialize::xmlwriter::{Options, XmlWriter, Result};

fn main() -> Result {
    let mut w = XmlWriter::new(Vec::<u8>::new(), Options::default());
    w.start_element("svg")?;
    w.write_attribute("xmlns", "http://www.w3.org/2000/svg")?;
    w.start_element("text")?;
    w.write_attribute("x", "10")?;
    w.write_text("length is 5")?;

    assert_eq!(
        String::from_utf8(w.end_document()?).unwrap(),
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="10">length is 5</text></svg>"#
    );
    Ok(())
}
```
*/

use std::fmt::Display;
use std::io::{self, Write};
use std::result;
use std::str::FromStr;

/// A result from serializing a document.
pub type Result = result::Result<(), Error>;

/// An error while serializing a document.
#[derive(Debug)]
pub enum Error {
    /// An error while running an io operation.
    IO(io::Error),
    /// Did not have opening element name when closing element.
    ClosedUnopenedElement,
    /// Attempted to write attribute before `start_element()` or after `close_element()`.
    AttributeWrittenBeforeElement,
    /// The header was already written, or written after an element.
    HeaderAlreadyWritten,
    /// Attempts to write text before `start_element()`.
    TextBeforeElement,
}

/// An XML node indention.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Indent {
    /// Disable indention and new lines.
    None,
    /// Indent with spaces. Preferred range is 0..4.
    Spaces(u8),
    /// Indent with tabs.
    Tabs,
}

/// An error while parsing an [`Indent`] from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIndentError(String);

impl FromStr for Indent {
    type Err = ParseIndentError;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "tabs" => Ok(Self::Tabs),
            n => n
                .parse()
                .map(Self::Spaces)
                .map_err(|_| ParseIndentError(s.to_string())),
        }
    }
}

impl Display for ParseIndentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected `none`, `tabs`, or a number of spaces but received `{}`",
            self.0
        )
    }
}
impl std::error::Error for ParseIndentError {}

/// An XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Use single quote marks instead of double quote.
    ///
    /// # Examples
    ///
    /// Before:
    ///
    /// ```text
    /// <rect fill="red"/>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <rect fill='red'/>
    /// ```
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// # Examples
    ///
    /// `Indent::Spaces(4)`
    ///
    /// Before:
    ///
    /// ```text
    /// <svg><rect fill="red"/></svg>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <svg>
    ///     <rect fill="red"/>
    /// </svg>
    /// ```
    ///
    /// Default: `None`, so text and tail content is written as-is
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// # Examples
    ///
    /// `Indent::Spaces(2)`
    ///
    /// Before:
    ///
    /// ```text
    /// <svg>
    ///     <rect fill="red" stroke="black"/>
    /// </svg>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <svg>
    ///     <rect
    ///       fill="red"
    ///       stroke="black"/>
    /// </svg>
    /// ```
    ///
    /// Default: `None`
    pub attributes_indent: Indent,

    /// Write self-closing tags when element is empty.
    ///
    /// Default: enabled
    pub enable_self_closing: bool,
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Options {
            use_single_quote: false,
            indent: Indent::None,
            attributes_indent: Indent::None,
            enable_self_closing: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum State {
    Empty,
    Document,
    Attributes,
}

#[derive(Clone, Debug)]
struct DepthData {
    element_name: Option<String>,
    has_children: bool,
}

/// An XML writer.
#[derive(Clone, Debug)]
pub struct XmlWriter<W: Write> {
    writer: W,
    state: State,
    preserve_whitespaces: bool,
    depth_stack: Vec<DepthData>,
    opt: Options,
}

impl<W: Write> XmlWriter<W> {
    /// Creates a new `XmlWriter`, writing data in the writer.
    #[inline]
    pub fn new(writer: W, opt: Options) -> Self {
        XmlWriter {
            writer,
            state: State::Empty,
            preserve_whitespaces: false,
            depth_stack: Vec::new(),
            opt,
        }
    }

    /// Writes a verbatim header, such as an XML declaration followed by a doctype.
    ///
    /// The header is not escaped.
    ///
    /// # Errors
    ///
    /// - When called twice, or after an element was started.
    pub fn write_header(&mut self, header: &str) -> Result {
        if self.state != State::Empty {
            return Err(Error::HeaderAlreadyWritten);
        }

        self.writer
            .write_all(header.as_bytes())
            .map_err(Error::IO)?;
        self.state = State::Document;

        Ok(())
    }

    /// Starts writing a new element.
    ///
    /// This method writes only the `<tag-name` part.
    ///
    /// # Errors
    ///
    /// When in a bad state or when io fails.
    pub fn start_element(&mut self, name: &str) -> Result {
        if self.state == State::Attributes {
            self.write_open_element()?;
        }

        if self.state != State::Empty {
            self.write_new_line()?;
        }

        if !self.preserve_whitespaces {
            self.write_node_indent()?;
        }

        self.writer.write_all(b"<").map_err(Error::IO)?;
        self.writer.write_all(name.as_bytes()).map_err(Error::IO)?;

        self.depth_stack.push(DepthData {
            element_name: Some(name.to_string()),
            has_children: false,
        });

        self.state = State::Attributes;

        Ok(())
    }

    /// Writes an attribute.
    ///
    /// Any occurrence of `&<>` and the active quote character in the value will be escaped.
    ///
    /// # Errors
    ///
    /// - When called before `start_element()`.
    /// - When called after `close_element()`.
    ///
    /// # Example
    ///
    /// ```
    /// use oxplot_serialize::xmlwriter::*;
    ///
    /// fn main() -> Result {
    ///     let mut w = XmlWriter::new(Vec::<u8>::new(), Options::default());
    ///     w.start_element("svg")?;
    ///     w.write_attribute("x", "5")?;
    ///     w.write_attribute("fill", "url(#gradient)")?;
    ///     assert_eq!(
    ///         String::from_utf8(w.end_document()?).unwrap(),
    ///         "<svg x=\"5\" fill=\"url(#gradient)\"/>",
    ///     );
    ///     Ok(())
    /// }
    /// ```
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result {
        if self.state != State::Attributes {
            return Err(Error::AttributeWrittenBeforeElement);
        }

        self.write_attribute_prefix(name).map_err(Error::IO)?;
        self.write_escaped(value, true).map_err(Error::IO)?;
        self.write_quote().map_err(Error::IO)
    }

    fn write_attribute_prefix(&mut self, name: &str) -> io::Result<()> {
        if self.opt.attributes_indent == Indent::None {
            self.writer.write_all(b" ")?;
        } else {
            self.writer.write_all(b"\n")?;

            let depth = self.depth_stack.len();
            if depth > 0 {
                self.write_indent(depth - 1, self.opt.indent)?;
            }

            self.write_indent(1, self.opt.attributes_indent)?;
        }

        self.writer.write_all(name.as_bytes())?;
        self.writer.write_all(b"=")?;
        self.write_quote()
    }

    /// Sets the preserve whitespaces flag.
    ///
    /// - If set, text nodes and elements are written without added line breaks or indents.
    /// - If not set, text nodes and elements will be indented.
    ///
    /// Can be set at any moment.
    pub fn set_preserve_whitespaces(&mut self, preserve: bool) {
        self.preserve_whitespaces = preserve;
    }

    /// Returns whether whitespace is currently being preserved.
    pub fn preserve_whitespaces(&self) -> bool {
        self.preserve_whitespaces
    }

    /// Writes a text node.
    ///
    /// `><&` will be escaped.
    ///
    /// # Errors
    ///
    /// - When called not after `start_element()`.
    pub fn write_text(&mut self, text: &str) -> Result {
        if self.state == State::Empty || self.depth_stack.is_empty() {
            return Err(Error::TextBeforeElement);
        }

        if self.state == State::Attributes {
            self.write_open_element()?;
        }

        self.write_new_line()?;
        self.write_node_indent()?;
        self.write_escaped(text, false).map_err(Error::IO)?;

        self.state = State::Document;

        Ok(())
    }

    /// Closes an open element.
    ///
    /// # Errors
    ///
    /// When in a bad state or when io fails.
    pub fn end_element(&mut self) -> Result {
        if let Some(depth) = self.depth_stack.pop() {
            if depth.has_children || !self.opt.enable_self_closing {
                // Close the empty node here as there were no children to close it.
                if !depth.has_children && !self.opt.enable_self_closing {
                    self.writer.write_all(b">").map_err(Error::IO)?;
                }

                if !self.preserve_whitespaces && depth.has_children {
                    self.write_new_line()?;
                    self.write_node_indent()?;
                }

                let Some(element_name) = depth.element_name else {
                    return Err(Error::ClosedUnopenedElement);
                };
                self.writer.write_all(b"</").map_err(Error::IO)?;
                self.writer
                    .write_all(element_name.as_bytes())
                    .map_err(Error::IO)?;
                self.writer.write_all(b">").map_err(Error::IO)?;
            } else {
                self.writer.write_all(b"/>").map_err(Error::IO)?;
            }
        }

        self.state = State::Document;

        Ok(())
    }

    /// Closes all open elements and returns back the writer.
    ///
    /// # Example
    ///
    /// ```
    /// use oxplot_serialize::xmlwriter::*;
    ///
    /// fn main() -> Result {
    ///     let options = Options {
    ///         indent: Indent::Spaces(4),
    ///         ..Options::default()
    ///     };
    ///     let mut w = XmlWriter::new(Vec::<u8>::new(), options);
    ///     w.start_element("svg")?;
    ///     w.start_element("g")?;
    ///     w.start_element("rect")?;
    ///     assert_eq!(
    ///         String::from_utf8(w.end_document()?).unwrap(),
    /// "<svg>
    ///     <g>
    ///         <rect/>
    ///     </g>
    /// </svg>
    /// "
    ///     );
    ///     Ok(())
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// When in a bad state or when io fails.
    pub fn end_document(mut self) -> result::Result<W, Error> {
        while !self.depth_stack.is_empty() {
            self.end_element()?;
        }

        self.write_new_line()?;

        Ok(self.writer)
    }

    fn write_escaped(&mut self, s: &str, escape_quotes: bool) -> io::Result<()> {
        let mut part_start_pos = 0;
        for (byte_pos, byte) in s.bytes().enumerate() {
            let escaped_char: Option<&[u8]> = match byte {
                b'&' => Some(b"&amp;"),
                b'>' => Some(b"&gt;"),
                b'<' => Some(b"&lt;"),
                b'"' if escape_quotes && !self.opt.use_single_quote => Some(b"&quot;"),
                b'\'' if escape_quotes && self.opt.use_single_quote => Some(b"&apos;"),
                _ => None,
            };
            if let Some(escaped_char) = escaped_char {
                self.writer.write_all(s[part_start_pos..byte_pos].as_bytes())?;
                self.writer.write_all(escaped_char)?;
                part_start_pos = byte_pos + 1;
            }
        }
        self.writer.write_all(s[part_start_pos..].as_bytes())
    }

    #[inline]
    fn get_quote_char(&self) -> u8 {
        if self.opt.use_single_quote {
            b'\''
        } else {
            b'"'
        }
    }

    #[inline]
    fn write_quote(&mut self) -> io::Result<()> {
        self.writer.write_all(&[self.get_quote_char()])
    }

    // Writes the end of the current opening element, so `>`.
    fn write_open_element(&mut self) -> Result {
        if let Some(depth) = self.depth_stack.last_mut() {
            depth.has_children = true;
            self.writer.write_all(b">").map_err(Error::IO)?;

            self.state = State::Document;
        }
        Ok(())
    }

    fn write_node_indent(&mut self) -> Result {
        self.write_indent(self.depth_stack.len(), self.opt.indent)
            .map_err(Error::IO)
    }

    fn write_indent(&mut self, depth: usize, indent: Indent) -> io::Result<()> {
        if indent == Indent::None || self.preserve_whitespaces {
            return Ok(());
        }

        for _ in 0..depth {
            match indent {
                Indent::None => {}
                Indent::Spaces(n) => {
                    for _ in 0..n {
                        self.writer.write_all(b" ")?;
                    }
                }
                Indent::Tabs => self.writer.write_all(b"\t")?,
            }
        }
        Ok(())
    }

    fn write_new_line(&mut self) -> Result {
        if self.opt.indent != Indent::None && !self.preserve_whitespaces {
            self.writer.write_all(b"\n").map_err(Error::IO)?;
        }
        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IO(err) => err.fmt(f),
            Self::ClosedUnopenedElement => {
                "Did not have opening element name when closing element.".fmt(f)
            }
            Self::AttributeWrittenBeforeElement => {
                "Attempted to write attribute before `start_element()` or after `close_element()`."
                    .fmt(f)
            }
            Self::TextBeforeElement => "Attempts to write text before `start_element()`.".fmt(f),
            Self::HeaderAlreadyWritten => {
                "The header must be written once, before any element.".fmt(f)
            }
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IO(err) => Some(err),
            _ => None,
        }
    }
}

#[test]
fn header_then_root() -> Result {
    let mut w = XmlWriter::new(Vec::<u8>::new(), Options::default());
    w.write_header("<?xml version=\"1.0\"?>")?;
    w.start_element("svg")?;
    w.end_element()?;
    assert_eq!(
        String::from_utf8_lossy(&w.end_document()?),
        "<?xml version=\"1.0\"?><svg/>"
    );

    let mut w = XmlWriter::new(Vec::<u8>::new(), Options::default());
    w.start_element("svg")?;
    assert!(matches!(
        w.write_header("<?xml?>"),
        Err(Error::HeaderAlreadyWritten)
    ));
    Ok(())
}

#[test]
fn text_and_tail_are_escaped() -> Result {
    let mut w = XmlWriter::new(Vec::<u8>::new(), Options::default());
    w.start_element("text")?;
    w.write_attribute("font-family", "\"Sans\" & <Serif>")?;
    w.write_text("a < b")?;
    w.start_element("tspan")?;
    w.write_text("c")?;
    w.end_element()?;
    w.write_text(" & d")?;
    assert_eq!(
        String::from_utf8_lossy(&w.end_document()?),
        "<text font-family=\"&quot;Sans&quot; &amp; &lt;Serif&gt;\">a &lt; b<tspan>c</tspan> &amp; d</text>"
    );
    Ok(())
}

#[test]
fn single_quotes_and_no_self_closing() -> Result {
    let options = Options {
        use_single_quote: true,
        enable_self_closing: false,
        ..Options::default()
    };
    let mut w = XmlWriter::new(Vec::<u8>::new(), options);
    w.start_element("rect")?;
    w.write_attribute("id", "it's")?;
    assert_eq!(
        String::from_utf8_lossy(&w.end_document()?),
        "<rect id='it&apos;s'></rect>"
    );
    Ok(())
}

#[test]
fn misuse_is_an_error() {
    let mut w = XmlWriter::new(Vec::<u8>::new(), Options::default());
    assert!(matches!(
        w.write_attribute("x", "1"),
        Err(Error::AttributeWrittenBeforeElement)
    ));
    assert!(matches!(w.write_text("x"), Err(Error::TextBeforeElement)));
}

#[test]
fn parse_indent() {
    assert_eq!("none".parse(), Ok(Indent::None));
    assert_eq!("tabs".parse(), Ok(Indent::Tabs));
    assert_eq!("2".parse(), Ok(Indent::Spaces(2)));
    assert!("two".parse::<Indent>().is_err());
}
