//! Mathematical formulas drawn by an external typesetting engine.
use crate::{
    attribute::Options,
    container::Container,
    document::Document,
    error::{BoxError, Error},
    node::Ref,
    transform::placed_group,
};

/// The font size formulas are laid out at, in points
pub const DEFAULT_SIZE_PT: f64 = 24.0;
/// The resolution formulas are laid out at, in dots per inch
pub const DEFAULT_DPI: f64 = 72.0;

/// Lays out formula source text.
pub trait FormulaParser {
    /// The fonts the parser measures glyphs with
    type Fonts;
    /// The laid out formula, which only the renderer needs to understand
    type Layout;

    /// Lays out the formula.
    ///
    /// # Errors
    /// When the text is not a valid formula
    fn parse(
        &self,
        text: &str,
        fonts: &Self::Fonts,
        size_pt: f64,
        dpi: f64,
    ) -> Result<Self::Layout, BoxError>;
}

/// Draws a laid out formula into a group.
pub trait FormulaRenderer<Layout> {
    /// Creates the elements of the formula under `target`, using its constructors so they're
    /// attached as they're created.
    ///
    /// # Errors
    /// When the layout cannot be drawn
    fn render(&self, target: FormulaGroup<'_>, layout: Layout) -> Result<(), BoxError>;
}

/// The engine used for drawing formulas.
pub struct Typesetter<P: FormulaParser, R> {
    /// Lays out the source text
    pub parser: P,
    /// The fonts given to the parser
    pub fonts: P::Fonts,
    /// Draws the layout
    pub renderer: R,
    /// The font size, in points
    pub size_pt: f64,
    /// The resolution, in dots per inch
    pub dpi: f64,
}

impl<P: FormulaParser, R: FormulaRenderer<P::Layout>> Typesetter<P, R> {
    /// Creates a typesetter that lays out formulas at 24pt and 72dpi
    pub fn new(parser: P, fonts: P::Fonts, renderer: R) -> Self {
        Self {
            parser,
            fonts,
            renderer,
            size_pt: DEFAULT_SIZE_PT,
            dpi: DEFAULT_DPI,
        }
    }

    pub(crate) fn typeset<'arena>(
        &self,
        document: Document<'arena>,
        text: &str,
        options: Options<'arena>,
    ) -> Result<FormulaGroup<'arena>, Error> {
        let node = placed_group(document, options)?;
        let group = FormulaGroup { node, document };
        let layout = self
            .parser
            .parse(text, &self.fonts, self.size_pt, self.dpi)
            .map_err(Error::Formula)?;
        self.renderer
            .render(group, layout)
            .map_err(Error::Formula)?;
        log::debug!(
            "rendered formula {text:?} into {} elements",
            group.node.descendants().count()
        );
        Ok(group)
    }
}

#[derive(Debug, Clone, Copy)]
/// A placed `<g>` element that a formula is drawn into
pub struct FormulaGroup<'arena> {
    node: Ref<'arena>,
    document: Document<'arena>,
}

impl<'arena> FormulaGroup<'arena> {
    /// Creates a `<use>` reference
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn r#use(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("use", options)
    }

    /// Creates a `<rect>`, such as for a fraction bar
    ///
    /// # Errors
    /// If the element cannot be created
    pub fn rect(&self, options: Options<'arena>) -> Result<Ref<'arena>, Error> {
        self.element("rect", options)
    }
}

impl<'arena> Container<'arena> for FormulaGroup<'arena> {
    fn node(&self) -> Ref<'arena> {
        self.node
    }

    fn document(&self) -> Document<'arena> {
        self.document
    }
}

#[cfg(test)]
use crate::{
    arena::Arena,
    attrs,
    attribute::Value,
    container::{Graphics, Shapes},
    test_utils::{FailingParser, RecordingParser, StackRenderer},
};

#[test]
fn formulas_are_parsed_at_the_typesetter_size() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let typesetter = Typesetter::new(RecordingParser::default(), "cm", StackRenderer);

    let group = document.formula(&typesetter, "x^2", attrs! { x: 5, scale: 1.5 })?;
    assert_eq!(
        typesetter.parser.calls.borrow().as_slice(),
        [(String::from("x^2"), String::from("cm"), 24.0, 72.0)]
    );
    assert_eq!(
        group.node().get_attribute("transform"),
        Some(Value::from("translate(5,0) scale(1.5)"))
    );

    let tags: Vec<_> = group
        .node()
        .children()
        .map(|n| n.tag().to_string())
        .collect();
    assert_eq!(tags, ["use", "use", "use", "rect"]);
    Ok(())
}

#[test]
fn typesetter_size_is_configurable() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let mut typesetter = Typesetter::new(RecordingParser::default(), "stix", StackRenderer);
    typesetter.size_pt = 12.0;
    typesetter.dpi = 96.0;

    let group = document.group(attrs! {})?;
    let formula = group.formula(&typesetter, "y", attrs! {})?;
    assert!(formula
        .node()
        .parent_node()
        .is_some_and(|p| p.ptr_eq(group.node())));
    assert_eq!(
        typesetter.parser.calls.borrow().as_slice(),
        [(String::from("y"), String::from("stix"), 12.0, 96.0)]
    );
    Ok(())
}

#[test]
fn formula_errors_are_propagated() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let typesetter = Typesetter::new(FailingParser, (), StackRenderer);

    let err = document
        .formula(&typesetter, "\\frac{", attrs! {})
        .expect_err("the formula is unbalanced");
    assert_eq!(err.to_string(), "formula engine error: unbalanced braces");
    assert!(std::error::Error::source(&err).is_some());
    Ok(())
}
