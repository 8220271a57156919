//! The root of a scene graph.
use std::{
    cell::{self, RefCell},
    collections::BTreeSet,
    fmt::Debug,
};

use crate::{
    arena::Arena,
    attribute::{normalize, Attributes, Options, Value},
    container::{Container, Defs, Graphics, Shapes},
    error::Error,
    name::QualName,
    node::Ref,
};

/// The namespace of SVG elements
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// The namespace of linking attributes
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// The attributes every document starts with, in the order they're written
pub const NAMESPACES: [(&str, &str); 4] = [
    ("version", "1.1"),
    ("xmlns", SVG_NAMESPACE),
    ("xmlns:svg", SVG_NAMESPACE),
    ("xmlns:xlink", XLINK_NAMESPACE),
];

/// The XML declaration and doctype written before a document
pub const HEADER: &str = r#"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" 
  "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#;

/// The width and height of a document without a size
pub const DEFAULT_SIZE: i64 = 500;

/// The state shared by every copy of a [`Document`]
pub(crate) struct Data<'arena> {
    arena: &'arena Arena<'arena>,
    root: Ref<'arena>,
    defs: Ref<'arena>,
    /// Ids of the glyphs defined in `defs`
    glyph_ids: RefCell<BTreeSet<String>>,
}

#[derive(Clone, Copy)]
/// An `<svg>` document, with a `<defs>` block for shared definitions such as glyphs.
///
/// A document is a cheap handle, and every copy refers to the same tree.
///
/// ```
/// use oxplot_ast::{arena::Arena, attrs, container::Shapes, document::Document};
///
/// let arena = Arena::new();
/// let document = Document::new(&arena, attrs! { width: 50, height: 50 })?;
/// let group = document.group(attrs! { stroke: "black" })?;
/// group.line(attrs! { x1: 0, y1: 50, x2: 50, y2: 0 })?;
/// document.line(attrs! { x1: 0, y1: 0, x2: 50, y2: 50, stroke: "red" }.parent(group.node()))?;
/// # use oxplot_ast::container::Container;
/// assert_eq!(group.node().child_count(), 2);
/// # Ok::<(), oxplot_ast::error::Error>(())
/// ```
pub struct Document<'arena> {
    data: &'arena Data<'arena>,
}

impl<'arena> Document<'arena> {
    /// Creates a document with the default namespace attributes, followed by the given
    /// attributes.
    ///
    /// A given attribute that shares a name with a default replaces its value. Any parent in the
    /// options is ignored, as the document's root is never attached to anything.
    ///
    /// # Errors
    /// When an attribute name is not a valid markup name
    pub fn new(arena: &'arena Arena<'arena>, options: Options<'arena>) -> Result<Self, Error> {
        let (options, parent) = options.into_parts();
        if parent.is_some() {
            log::warn!("ignoring the parent given to a document");
        }
        let mut attributes = normalize(
            NAMESPACES
                .iter()
                .map(|(name, value)| ((*name).to_string(), Value::from(*value)))
                .collect(),
        )?;
        attributes.extend(normalize(options)?);

        let root = arena.alloc(QualName::parse("svg")?, attributes);
        let defs = arena.alloc(QualName::parse("defs")?, Attributes::new());
        root.append_child(defs);
        log::debug!("created document #{} with <defs> #{}", root.id(), defs.id());

        let data = arena.alloc_document(Data {
            arena,
            root,
            defs,
            glyph_ids: RefCell::new(BTreeSet::new()),
        });
        Ok(Self { data })
    }

    /// Returns the `<svg>` element
    pub fn root(&self) -> Ref<'arena> {
        self.data.root
    }

    /// Returns the `<defs>` block created with the document, which holds embedded glyphs
    pub fn defs(&self) -> Defs<'arena> {
        Defs::from_node(*self, self.data.defs)
    }

    /// Creates an additional `<defs>` block
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn new_defs(&self, options: Options<'arena>) -> Result<Defs<'arena>, Error> {
        Defs::new(*self, options.or_parent(self.root()))
    }

    /// Returns the ids of the glyphs defined in the document's `<defs>`
    ///
    /// # Panics
    /// If glyphs are being embedded at the same time
    pub fn glyph_ids(&self) -> cell::Ref<'_, BTreeSet<String>> {
        self.data.glyph_ids.borrow()
    }

    /// Returns whether a glyph with the id is defined
    pub fn has_glyph(&self, id: &str) -> bool {
        self.data.glyph_ids.borrow().contains(id)
    }

    /// Records that a glyph is defined, returning whether it's new
    pub(crate) fn register_glyph(&self, id: String) -> bool {
        self.data.glyph_ids.borrow_mut().insert(id)
    }

    /// Returns the `width` attribute, or 500 when absent
    ///
    /// # Errors
    /// If the width is not a number
    pub fn width(&self) -> Result<i64, Error> {
        self.dimension("width")
    }

    /// Returns the `height` attribute, or 500 when absent
    ///
    /// # Errors
    /// If the height is not a number
    pub fn height(&self) -> Result<i64, Error> {
        self.dimension("height")
    }

    fn dimension(&self, name: &str) -> Result<i64, Error> {
        let value = match self.root().get_attribute(name) {
            None => return Ok(DEFAULT_SIZE),
            Some(Value::Integer(n)) => return Ok(n),
            Some(value) => value,
        };
        value
            .as_number()
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64)
            .ok_or_else(|| Error::InvalidValue {
                name: name.to_string(),
                reason: format!("expected a number, found {value:?}"),
            })
    }

    /// Returns whether the node is part of this document's tree
    pub fn owns(&self, node: Ref<'arena>) -> bool {
        node.top().ptr_eq(self.data.root)
    }

    pub(crate) fn arena(&self) -> &'arena Arena<'arena> {
        self.data.arena
    }
}

impl<'arena> Container<'arena> for Document<'arena> {
    fn node(&self) -> Ref<'arena> {
        self.data.root
    }

    fn document(&self) -> Document<'arena> {
        *self
    }
}
impl<'arena> Shapes<'arena> for Document<'arena> {}
impl<'arena> Graphics<'arena> for Document<'arena> {}

impl Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.data.root.id())
            .field("defs", &self.data.defs.id())
            .field("glyph_ids", &self.data.glyph_ids)
            .finish()
    }
}

#[cfg(test)]
use crate::attrs;

#[test]
fn namespace_defaults() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let attributes: Vec<_> = document
        .root()
        .attributes()
        .iter()
        .map(|a| (a.name.to_string(), a.value.clone()))
        .collect();
    pretty_assertions::assert_eq!(
        attributes,
        NAMESPACES
            .iter()
            .map(|(name, value)| ((*name).to_string(), Value::from(*value)))
            .collect::<Vec<_>>()
    );
    assert_eq!(document.root().tag().to_string(), "svg");
    Ok(())
}

#[test]
fn namespace_overrides_replace_in_place() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(
        &arena,
        attrs! { width: 10, version: "2.0" }.with("xmlns:xlink", "urn:link"),
    )?;

    let names: Vec<_> = document
        .root()
        .attributes()
        .iter()
        .map(|a| a.name.to_string())
        .collect();
    assert_eq!(names, ["version", "xmlns", "xmlns:svg", "xmlns:xlink", "width"]);
    assert_eq!(document.root().get_attribute("version"), Some(Value::from("2.0")));
    assert_eq!(
        document.root().get_attribute("xmlns:xlink"),
        Some(Value::from("urn:link"))
    );
    Ok(())
}

#[test]
fn defs_exist_from_construction() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let first = document
        .root()
        .first_child()
        .ok_or(anyhow::anyhow!("missing defs"))?;
    assert!(first.ptr_eq(document.defs().node()));
    assert!(document.glyph_ids().is_empty());
    assert!(!document.has_glyph("a"));
    Ok(())
}

#[test]
fn dimensions() -> anyhow::Result<()> {
    let arena = Arena::new();
    let sized = Document::new(&arena, attrs! { width: 150, height: "75.9" })?;
    assert_eq!(sized.width()?, 150);
    assert_eq!(sized.height()?, 75);

    let unsized_document = Document::new(&arena, attrs! {})?;
    assert_eq!(unsized_document.width()?, DEFAULT_SIZE);
    assert_eq!(unsized_document.height()?, 500);

    let floating = Document::new(&arena, attrs! { width: 20.5, height: "100%" })?;
    assert_eq!(floating.width()?, 20);
    assert!(matches!(floating.height(), Err(Error::InvalidValue { .. })));
    Ok(())
}

#[test]
fn documents_share_an_arena_without_sharing_glyphs() -> anyhow::Result<()> {
    let arena = Arena::new();
    let first = Document::new(&arena, attrs! {})?;
    let second = Document::new(&arena, attrs! {})?;

    first.register_glyph(String::from("glyph-97"));
    assert!(first.has_glyph("glyph-97"));
    assert!(!second.has_glyph("glyph-97"));
    assert!(first.owns(first.defs().node()));
    assert!(!second.owns(first.defs().node()));
    Ok(())
}
