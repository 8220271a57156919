//! Writing documents as markup.
use std::io::{self, Write};

use oxplot_serialize::{
    xmlwriter::{self, XmlWriter},
    Encoding, ToValue,
};

use crate::{
    document::{Document, HEADER},
    error::Error,
    node::Ref,
};

#[derive(Debug, Clone, Copy)]
/// How a document is written.
pub struct WriteOptions {
    /// Whether the XML declaration and doctype are written before the root
    pub header: bool,
    /// The encoding of the written bytes
    pub encoding: Encoding,
    /// The formatting of elements and attributes
    pub format: xmlwriter::Options,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            header: true,
            encoding: Encoding::default(),
            format: xmlwriter::Options::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// An owned copy of an element, where every attribute value is text.
pub struct Element {
    /// The qualified name of the tag
    pub name: String,
    /// The attributes, in the order they were set
    pub attributes: Vec<(String, String)>,
    /// Text before the first child
    pub text: Option<String>,
    /// Text after the closing tag
    pub tail: Option<String>,
    /// The children, in the order they were attached
    pub children: Vec<Element>,
}

impl Element {
    /// Copies the node and its descendants, converting each attribute value to text.
    ///
    /// # Errors
    /// When an attribute value cannot be written as text
    pub fn clone_node(node: Ref<'_>) -> Result<Self, Error> {
        let name = node.tag().to_string();
        let attributes = node
            .attributes()
            .iter()
            .filter(|attr| !attr.name.matches("root"))
            .map(|attr| -> Result<(String, String), Error> {
                let value = attr.value.to_value_string().map_err(|source| {
                    Error::Serialization {
                        element: name.clone(),
                        attribute: attr.name.to_string(),
                        source,
                    }
                })?;
                Ok((attr.name.to_string(), value))
            })
            .collect::<Result<_, Error>>()?;
        let children = node
            .children()
            .map(Self::clone_node)
            .collect::<Result<_, Error>>()?;
        Ok(Self {
            name,
            attributes,
            text: node.text(),
            tail: node.tail(),
            children,
        })
    }

    /// Returns the value of the named attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Writes the element and its descendants, but not its tail.
    ///
    /// Elements with text content, or with a child followed by text, are written without added
    /// whitespace.
    ///
    /// # Errors
    /// If the writer fails
    pub fn write_to<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<(), Error> {
        writer.start_element(&self.name)?;
        for (name, value) in &self.attributes {
            writer.write_attribute(name, value)?;
        }

        let previous = writer.preserve_whitespaces();
        if self.has_mixed_content() {
            writer.set_preserve_whitespaces(true);
        }
        if let Some(text) = non_empty(self.text.as_ref()) {
            writer.write_text(text)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
            if let Some(tail) = non_empty(child.tail.as_ref()) {
                writer.write_text(tail)?;
            }
        }
        writer.end_element()?;
        writer.set_preserve_whitespaces(previous);
        Ok(())
    }

    fn has_mixed_content(&self) -> bool {
        non_empty(self.text.as_ref()).is_some()
            || self
                .children
                .iter()
                .any(|child| non_empty(child.tail.as_ref()).is_some())
    }
}

fn non_empty(text: Option<&String>) -> Option<&str> {
    text.map(String::as_str).filter(|text| !text.is_empty())
}

impl<'arena> Document<'arena> {
    /// Returns an owned copy of the document's tree with every attribute value as text.
    ///
    /// The document itself is left unchanged.
    ///
    /// # Errors
    /// When an attribute value cannot be written as text
    pub fn snapshot(&self) -> Result<Element, Error> {
        Element::clone_node(self.root())
    }

    /// Returns the document as markup, with the encoding's character references applied
    ///
    /// # Errors
    /// When an attribute value cannot be written as text
    pub fn to_string_with(&self, options: &WriteOptions) -> Result<String, Error> {
        let snapshot = self.snapshot()?;
        let mut writer = XmlWriter::new(Vec::new(), options.format);
        if options.header {
            writer.write_header(HEADER)?;
        }
        snapshot.write_to(&mut writer)?;
        let markup = String::from_utf8(writer.end_document()?)
            .map_err(|err| Error::Sink(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        Ok(options.encoding.apply(markup))
    }

    /// Returns the document as bytes in the requested encoding
    ///
    /// # Errors
    /// When an attribute value cannot be written as text
    pub fn to_bytes(&self, options: &WriteOptions) -> Result<Vec<u8>, Error> {
        let markup = self.to_string_with(options)?;
        Ok(options.encoding.encode(markup))
    }

    /// Writes the document to the sink.
    ///
    /// The document is fully serialized before anything is given to the sink, so a document
    /// that cannot be written leaves the sink untouched.
    ///
    /// # Errors
    /// - When an attribute value cannot be written as text
    /// - When the sink fails
    pub fn write<W: Write>(&self, mut sink: W, options: &WriteOptions) -> Result<(), Error> {
        let bytes = self.to_bytes(options)?;
        log::debug!(
            "writing {} bytes as {}",
            bytes.len(),
            options.encoding.label()
        );
        sink.write_all(&bytes).map_err(Error::Sink)?;
        sink.flush().map_err(Error::Sink)
    }
}

#[cfg(test)]
use crate::{
    arena::Arena,
    attribute::Value,
    attrs,
    container::{Container, Graphics, Shapes},
    test_utils::MonoFont,
};
#[cfg(test)]
use oxplot_serialize::xmlwriter::Indent;

#[cfg(test)]
fn without_header() -> WriteOptions {
    WriteOptions {
        header: false,
        ..WriteOptions::default()
    }
}

#[test]
fn write_rect_scene() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! { width: 150, height: 150 })?;
    document.rect(attrs! { x: 0, y: 0, width: 150, height: 150, stroke_width: 5 })?;

    let mut sink = Vec::new();
    document.write(&mut sink, &WriteOptions::default())?;
    insta::assert_snapshot!(String::from_utf8(sink)?, @r#"
    <?xml version="1.0" standalone="no"?>
    <!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" 
      "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd"><svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="150" height="150"><defs/><rect x="0" y="0" width="150" height="150" stroke-width="5"/></svg>
    "#);
    Ok(())
}

#[test]
fn write_is_repeatable_and_leaves_the_tree_alone() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let group = document.group(attrs! { stroke: "black" })?;
    group.polyline(attrs! { points: (0, 0, 10.5, 10) })?;
    document.embedded_text(&MonoFont, "hi", attrs! { x: 5 })?;

    let attributes_before = group.node().attributes().clone();
    let count_before = document.root().descendants().count();

    let first = document.to_bytes(&WriteOptions::default())?;
    let second = document.to_bytes(&WriteOptions::default())?;
    assert_eq!(first, second);
    pretty_assertions::assert_eq!(*group.node().attributes(), attributes_before);
    assert_eq!(document.root().descendants().count(), count_before);
    assert_eq!(
        group
            .node()
            .first_child()
            .and_then(|n| n.get_attribute("points")),
        Some(Value::from((0, 0, 10.5, 10)))
    );
    Ok(())
}

#[test]
fn write_embedded_text() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    document.embedded_text(&MonoFont, "aa", attrs! { x: 1, y: 2, rotation: 30, fill: "red" })?;
    document.embedded_text(&MonoFont, "a", attrs! { scale: 2 })?;

    let markup = document.to_string_with(&WriteOptions {
        format: xmlwriter::Options {
            indent: Indent::Spaces(2),
            ..xmlwriter::Options::default()
        },
        ..without_header()
    })?;
    insta::assert_snapshot!(markup, @r##"
    <svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
      <defs>
        <path id="glyph-97" d="M0 0h97"/>
      </defs>
      <g transform="translate(1,2) rotate(30)" fill="red">
        <use x="0" xlink:href="#glyph-97"/>
        <use x="10" xlink:href="#glyph-97"/>
      </g>
      <g transform="translate(0,0) scale(2)">
        <use x="0" xlink:href="#glyph-97"/>
      </g>
    </svg>
    "##);
    Ok(())
}

#[test]
fn write_text_and_tails() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let text = document.text(attrs! { x: 10, y: 20 })?;
    text.set_text("a < b");
    let group = document.group(attrs! {})?;
    group.node().set_text("");
    document.root().set_tail("ignored");
    let label = document.element("title", attrs! {})?;
    label.set_text("plot & \"data\"");
    label.set_tail("\n");

    let markup = document.to_string_with(&without_header())?;
    insta::assert_snapshot!(markup, @r#"
    <svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><defs/><text x="10" y="20">a &lt; b</text><g/><title>plot &amp; "data"</title>
    </svg>
    "#);
    Ok(())
}

#[test]
fn write_with_format_options() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! { width: 10 })?;
    document.circle(attrs! { r: 2.5 })?;

    let markup = document.to_string_with(&WriteOptions {
        header: true,
        encoding: Encoding::Unicode,
        format: xmlwriter::Options {
            use_single_quote: true,
            indent: Indent::Tabs,
            enable_self_closing: false,
            ..xmlwriter::Options::default()
        },
    })?;
    assert!(markup.starts_with(HEADER));
    assert_eq!(
        &markup[HEADER.len()..],
        "\n<svg version='1.1' xmlns='http://www.w3.org/2000/svg' \
         xmlns:svg='http://www.w3.org/2000/svg' xmlns:xlink='http://www.w3.org/1999/xlink' \
         width='10'>\n\t<defs></defs>\n\t<circle r='2.5'></circle>\n</svg>\n"
    );
    Ok(())
}

#[test]
fn write_us_ascii() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    document.text(attrs! {})?.set_text("π ≈ 3.14");

    let options = WriteOptions {
        encoding: Encoding::UsAscii,
        ..without_header()
    };
    let bytes = document.to_bytes(&options)?;
    assert!(bytes.is_ascii());
    let markup = String::from_utf8(bytes)?;
    assert!(markup.contains("<text>&#960; &#8776; 3.14</text>"));

    let utf8 = document.to_string_with(&without_header())?;
    assert!(utf8.contains("<text>π ≈ 3.14</text>"));
    Ok(())
}

#[test]
fn invalid_values_fail_before_writing() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let group = document.group(attrs! {})?;
    group.rect(attrs! { width: f64::INFINITY })?;

    let mut sink = Vec::new();
    let err = document
        .write(&mut sink, &WriteOptions::default())
        .expect_err("infinity has no markup form");
    assert!(sink.is_empty());
    assert_eq!(
        err.to_string(),
        "cannot write `width` of `<rect>`: the number `inf` cannot be written as markup"
    );

    group.node().set_attribute("points", Value::List(vec![Value::from((1, 2))]))?;
    assert!(matches!(
        document.snapshot(),
        Err(Error::Serialization { element, .. }) if element == "g"
    ));
    Ok(())
}

#[test]
fn sink_errors_are_reported() -> anyhow::Result<()> {
    struct ClosedSink;
    impl Write for ClosedSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let err = document
        .write(ClosedSink, &WriteOptions::default())
        .expect_err("the sink is closed");
    assert!(matches!(&err, Error::Sink(source) if source.kind() == io::ErrorKind::BrokenPipe));
    Ok(())
}

#[test]
fn snapshot_copies_the_tree() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! { viewBox: (0, 0, 150, 150) })?;
    document.line(attrs! { x1: 0, stroke_dasharray: vec![5, 2] })?;

    let snapshot = document.snapshot()?;
    assert_eq!(snapshot.attribute("viewBox"), Some("0, 0, 150, 150"));
    pretty_assertions::assert_eq!(
        snapshot.children[1],
        Element {
            name: String::from("line"),
            attributes: vec![
                (String::from("x1"), String::from("0")),
                (String::from("stroke-dasharray"), String::from("5, 2")),
            ],
            ..Element::default()
        }
    );
    Ok(())
}
