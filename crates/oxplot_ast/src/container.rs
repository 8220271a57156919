//! Elements with constructors for their children.
//!
//! Every constructor attaches the new element to the container, unless the options name another
//! parent within the same document.
use crate::{
    attribute::Options,
    document::Document,
    element,
    error::Error,
    formula::{FormulaGroup, FormulaParser, FormulaRenderer, Typesetter},
    glyph::{self, FontEngine},
    node::Ref,
};

/// An element that new elements can be attached to.
pub trait Container<'arena> {
    /// The node new elements are attached to
    fn node(&self) -> Ref<'arena>;

    /// The document the container belongs to
    fn document(&self) -> Document<'arena>;

    /// Creates an element with any tag under the container.
    ///
    /// # Errors
    /// If the element cannot be created
    fn element(&self, tag: &str, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        element::create(self.document(), tag, options.or_parent(self.node()))
    }
}

/// A container for basic shapes and groups.
pub trait Shapes<'arena>: Container<'arena> {
    /// Creates a `<g>` group
    ///
    /// # Errors
    /// If the element cannot be created
    fn group(&self, options: Options<'arena>) -> Result<Group<'arena>, Error> {
        Group::new(self.document(), options.or_parent(self.node()))
    }

    /// Creates a `<line>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn line(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("line", options)
    }

    /// Creates a `<polyline>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn polyline(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("polyline", options)
    }

    /// Creates a `<polygon>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn polygon(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("polygon", options)
    }

    /// Creates a `<rect>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn rect(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("rect", options)
    }

    /// Creates a `<circle>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn circle(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("circle", options)
    }

    /// Creates an `<ellipse>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn ellipse(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("ellipse", options)
    }

    /// Creates a `<path>`
    ///
    /// # Errors
    /// If the element cannot be created
    fn path(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("path", options)
    }

    /// Creates a `<text>`, whose content can be set with [`Node::set_text`](crate::node::Node::set_text)
    ///
    /// # Errors
    /// If the element cannot be created
    fn text(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("text", options)
    }
}

/// A container for drawn content, including references and embedded text.
pub trait Graphics<'arena>: Shapes<'arena> {
    /// Creates a `<use>` reference
    ///
    /// # Errors
    /// If the element cannot be created
    fn r#use(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("use", options)
    }

    /// Creates a placed group of glyph references for the text, adding any glyphs the document
    /// hasn't seen yet to its `<defs>`.
    ///
    /// The options `x`, `y`, `rotation`, and `scale` place the group; the rest are written to it.
    ///
    /// # Errors
    /// If the group cannot be created, the placement is invalid, or the font engine fails
    fn embedded_text<F>(
        &self,
        font: &F,
        text: &str,
        options: Options<'arena>,
    ) -> Result<Ref<'arena>, Error>
    where
        F: FontEngine + ?Sized,
    {
        glyph::embed(self.document(), font, text, options.or_parent(self.node()))
    }

    /// Creates a placed group and has the typesetter draw the formula into it.
    ///
    /// The options `x`, `y`, `rotation`, and `scale` place the group; the rest are written to it.
    ///
    /// # Errors
    /// If the group cannot be created, the placement is invalid, or the formula engine fails
    fn formula<P, R>(
        &self,
        typesetter: &Typesetter<P, R>,
        text: &str,
        options: Options<'arena>,
    ) -> Result<FormulaGroup<'arena>, Error>
    where
        P: FormulaParser,
        R: FormulaRenderer<P::Layout>,
    {
        typesetter.typeset(self.document(), text, options.or_parent(self.node()))
    }
}

#[derive(Debug, Clone, Copy)]
/// A `<g>` element
pub struct Group<'arena> {
    node: Ref<'arena>,
    document: Document<'arena>,
}

impl<'arena> Group<'arena> {
    /// Creates a group under the parent given in the options
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn new(document: Document<'arena>, options: Options<'arena>) -> Result<Self, Error> {
        let node = element::create(document, "g", options)?;
        Ok(Self { node, document })
    }
}

impl<'arena> Container<'arena> for Group<'arena> {
    fn node(&self) -> Ref<'arena> {
        self.node
    }

    fn document(&self) -> Document<'arena> {
        self.document
    }
}
impl<'arena> Shapes<'arena> for Group<'arena> {}
impl<'arena> Graphics<'arena> for Group<'arena> {}

#[derive(Debug, Clone, Copy)]
/// A `<defs>` element, for content that is only drawn when referenced
pub struct Defs<'arena> {
    node: Ref<'arena>,
    document: Document<'arena>,
}

impl<'arena> Defs<'arena> {
    /// Creates a definitions block under the parent given in the options
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn new(document: Document<'arena>, options: Options<'arena>) -> Result<Self, Error> {
        let node = element::create(document, "defs", options)?;
        Ok(Self { node, document })
    }

    pub(crate) fn from_node(document: Document<'arena>, node: Ref<'arena>) -> Self {
        Self { node, document }
    }

    /// Creates a `<linearGradient>`
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn linear_gradient(&self, options: Options<'arena>) -> Result<Gradient<'arena>, Error> {
        Gradient::new(self.document, GradientKind::Linear, options.or_parent(self.node))
    }

    /// Creates a `<radialGradient>`
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn radial_gradient(&self, options: Options<'arena>) -> Result<Gradient<'arena>, Error> {
        Gradient::new(self.document, GradientKind::Radial, options.or_parent(self.node))
    }
}

impl<'arena> Container<'arena> for Defs<'arena> {
    fn node(&self) -> Ref<'arena> {
        self.node
    }

    fn document(&self) -> Document<'arena> {
        self.document
    }
}
impl<'arena> Shapes<'arena> for Defs<'arena> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The shape of a gradient
pub enum GradientKind {
    /// Colours change along a vector
    Linear,
    /// Colours change outwards from a focal point
    Radial,
}

impl GradientKind {
    /// The tag of the gradient's element
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Linear => "linearGradient",
            Self::Radial => "radialGradient",
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// A `<linearGradient>` or `<radialGradient>` element
pub struct Gradient<'arena> {
    node: Ref<'arena>,
    document: Document<'arena>,
    kind: GradientKind,
}

impl<'arena> Gradient<'arena> {
    /// Creates a gradient under the parent given in the options
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn new(
        document: Document<'arena>,
        kind: GradientKind,
        options: Options<'arena>,
    ) -> Result<Self, Error> {
        let node = element::create(document, kind.tag(), options)?;
        Ok(Self {
            node,
            document,
            kind,
        })
    }

    /// Returns whether the gradient is linear or radial
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Creates a `<stop>`
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn stop(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("stop", options)
    }
}

impl<'arena> Container<'arena> for Gradient<'arena> {
    fn node(&self) -> Ref<'arena> {
        self.node
    }

    fn document(&self) -> Document<'arena> {
        self.document
    }
}

#[cfg(test)]
use crate::{arena::Arena, attrs, attribute::Value};

#[test]
fn bound_constructors_attach_to_their_container() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let group = document.group(attrs! { stroke: "black" })?;
    let line = group.line(attrs! { x1: 0, y1: 0, x2: 10, y2: 10 })?;
    let nested = group.group(attrs! {})?;
    let circle = nested.circle(attrs! { r: 5 })?;

    assert!(line.parent_node().is_some_and(|p| p.ptr_eq(group.node())));
    assert!(nested.node().parent_node().is_some_and(|p| p.ptr_eq(group.node())));
    assert!(circle.parent_node().is_some_and(|p| p.ptr_eq(nested.node())));
    assert!(group.node().parent_node().is_some_and(|p| p.ptr_eq(document.root())));
    Ok(())
}

#[test]
fn explicit_parent_overrides_the_container() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let group = document.group(attrs! {})?;

    let line = document.line(attrs! { stroke: "red" }.parent(group.node()))?;
    assert!(line.parent_node().is_some_and(|p| p.ptr_eq(group.node())));
    assert_eq!(document.root().child_count(), 2, "defs and the group");
    Ok(())
}

#[test]
fn gradients_use_their_kind_for_the_tag() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let defs = document.defs();

    let linear = defs.linear_gradient(attrs! {}.with("id", "fade"))?;
    let radial = defs.radial_gradient(attrs! {}.with("id", "glow"))?;
    linear.stop(attrs! { offset: "5%", stop_color: "#F60" })?;
    let stop = radial.stop(attrs! { offset: "95%", stop_color: "#FF6" })?;

    assert_eq!(linear.kind(), GradientKind::Linear);
    assert_eq!(linear.node().tag().to_string(), "linearGradient");
    assert_eq!(radial.node().tag().to_string(), "radialGradient");
    assert_eq!(
        stop.get_attribute("stop-color"),
        Some(Value::from("#FF6"))
    );
    assert_eq!(defs.node().child_count(), 2);
    Ok(())
}

#[test]
fn every_shape_has_its_tag() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let defs = document.new_defs(attrs! {})?;

    defs.group(attrs! {})?;
    defs.line(attrs! {})?;
    defs.polyline(attrs! { points: (0, 0, 10, 10) })?;
    defs.polygon(attrs! {})?;
    defs.rect(attrs! {})?;
    defs.circle(attrs! {})?;
    defs.ellipse(attrs! {})?;
    defs.path(attrs! { d: "M0 0" })?;
    defs.text(attrs! {})?.set_text("label");
    document.r#use(attrs! {}.with("xlink:href", "#label"))?;
    document.element("title", attrs! {})?;

    let tags: Vec<_> = defs.node().children().map(|n| n.tag().to_string()).collect();
    assert_eq!(
        tags,
        ["g", "line", "polyline", "polygon", "rect", "circle", "ellipse", "path", "text"]
    );
    let tags: Vec<_> = document
        .root()
        .children()
        .map(|n| n.tag().to_string())
        .collect();
    assert_eq!(tags, ["defs", "defs", "use", "title"]);
    Ok(())
}
