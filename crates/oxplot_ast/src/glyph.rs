//! Text drawn with glyph outlines embedded in the document.
use std::collections::BTreeSet;

use crate::{
    attribute::Options,
    container::Shapes,
    document::Document,
    element,
    error::{BoxError, Error},
    node::Ref,
    transform::{format_general, placed_group},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// The outline of a glyph, written as a `<path>` in the document's `<defs>`
pub struct GlyphDefinition {
    /// The id glyph references point to
    pub id: String,
    /// The path data of the outline
    pub path_data: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// The layout of a piece of text as a sequence of glyphs
pub struct GlyphRun {
    /// The horizontal offset of each glyph
    pub x_positions: Vec<f64>,
    /// The id of each glyph, in the same order as `x_positions`
    pub glyph_ids: Vec<String>,
    /// Outlines for glyphs the document doesn't define yet
    pub glyph_paths: Vec<GlyphDefinition>,
}

/// A source of glyph outlines and text layout.
pub trait FontEngine {
    /// Lays out the text as glyphs.
    ///
    /// Outlines should only be returned for glyphs whose id is not in `existing`.
    ///
    /// # Errors
    /// When the text cannot be laid out, such as when a character has no glyph
    fn glyphs_for(&self, text: &str, existing: &BTreeSet<String>) -> Result<GlyphRun, BoxError>;
}

impl<F: FontEngine + ?Sized> FontEngine for &F {
    fn glyphs_for(&self, text: &str, existing: &BTreeSet<String>) -> Result<GlyphRun, BoxError> {
        (**self).glyphs_for(text, existing)
    }
}

/// Creates a placed group with a `<use>` for each glyph of the text, and defines any new glyphs
/// in the document's `<defs>`.
pub(crate) fn embed<'arena, F>(
    document: Document<'arena>,
    font: &F,
    text: &str,
    options: Options<'arena>,
) -> Result<Ref<'arena>, Error>
where
    F: FontEngine + ?Sized,
{
    let group = placed_group(document, options)?;
    let run = font
        .glyphs_for(text, &document.glyph_ids())
        .map_err(Error::Font)?;

    if run.x_positions.len() != run.glyph_ids.len() {
        log::warn!(
            "font engine returned {} positions for {} glyphs of {text:?}",
            run.x_positions.len(),
            run.glyph_ids.len()
        );
    }
    for (x, id) in run.x_positions.iter().zip(&run.glyph_ids) {
        element::create(
            document,
            "use",
            Options::new()
                .with("x", format_general(*x, 6))
                .with("xlink:href", format!("#{id}"))
                .parent(group),
        )?;
    }

    let defs = document.defs();
    for GlyphDefinition { id, path_data } in run.glyph_paths {
        if document.has_glyph(&id) {
            log::debug!("glyph `{id}` is already defined");
            continue;
        }
        defs.path(Options::new().with("id", id.as_str()).with("d", path_data))?;
        log::debug!("defined glyph `{id}`");
        document.register_glyph(id);
    }
    Ok(group)
}

#[cfg(test)]
use crate::{
    arena::Arena,
    attrs,
    attribute::Value,
    container::{Container, Graphics},
    test_utils::{FailingFont, LeakyFont, MonoFont},
};

#[cfg(test)]
fn hrefs(group: Ref) -> Vec<Option<Value>> {
    group
        .children()
        .map(|node| node.get_attribute("xlink:href"))
        .collect()
}

#[cfg(test)]
fn glyph_paths(document: Document) -> Vec<String> {
    document
        .defs()
        .node()
        .children()
        .filter_map(|node| node.get_attribute("id"))
        .filter_map(|id| id.as_str().map(String::from))
        .collect()
}

#[test]
fn embedded_text_references_each_glyph() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let group = document.embedded_text(&MonoFont, "aba", attrs! { x: 10, y: 20, fill: "blue" })?;
    let names: Vec<_> = group
        .attributes()
        .iter()
        .map(|a| a.name.to_string())
        .collect();
    assert_eq!(names, ["transform", "fill"]);
    assert_eq!(
        group.get_attribute("transform"),
        Some(Value::from("translate(10,20)"))
    );

    let positions: Vec<_> = group
        .children()
        .map(|node| node.get_attribute("x"))
        .collect();
    assert_eq!(
        positions,
        [
            Some(Value::from("0")),
            Some(Value::from("10")),
            Some(Value::from("20"))
        ]
    );
    assert_eq!(
        hrefs(group),
        [
            Some(Value::from("#glyph-97")),
            Some(Value::from("#glyph-98")),
            Some(Value::from("#glyph-97"))
        ]
    );
    assert_eq!(glyph_paths(document), ["glyph-97", "glyph-98"]);
    Ok(())
}

#[test]
fn glyphs_are_defined_once_per_document() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let first = document.embedded_text(&MonoFont, "a", attrs! {})?;
    let group = document.group(attrs! {})?;
    let second = group.embedded_text(&MonoFont, "ab", attrs! { rotation: 90 })?;

    assert_eq!(glyph_paths(document), ["glyph-97", "glyph-98"]);
    assert_eq!(
        document.glyph_ids().iter().collect::<Vec<_>>(),
        ["glyph-97", "glyph-98"]
    );
    assert_eq!(hrefs(first), [Some(Value::from("#glyph-97"))]);
    assert_eq!(
        hrefs(second),
        [Some(Value::from("#glyph-97")), Some(Value::from("#glyph-98"))]
    );
    assert_eq!(
        second.get_attribute("transform"),
        Some(Value::from("translate(0,0) rotate(90)"))
    );
    Ok(())
}

#[test]
fn glyphs_from_a_careless_font_are_still_deduplicated() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    document.embedded_text(&LeakyFont, "aa", attrs! {})?;
    document.embedded_text(&LeakyFont, "a", attrs! {})?;
    assert_eq!(glyph_paths(document), ["glyph-97"]);
    Ok(())
}

#[test]
fn mismatched_runs_are_zipped() -> anyhow::Result<()> {
    struct Truncated;
    impl FontEngine for Truncated {
        fn glyphs_for(&self, _: &str, _: &BTreeSet<String>) -> Result<GlyphRun, BoxError> {
            Ok(GlyphRun {
                x_positions: vec![0.0, 1.5, 3.0],
                glyph_ids: vec![String::from("a"), String::from("b")],
                glyph_paths: vec![],
            })
        }
    }

    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let group = document.embedded_text(&Truncated, "abc", attrs! {})?;
    assert_eq!(
        hrefs(group),
        [Some(Value::from("#a")), Some(Value::from("#b"))]
    );
    assert_eq!(
        group.last_child().and_then(|n| n.get_attribute("x")),
        Some(Value::from("1.5"))
    );
    Ok(())
}

#[test]
fn font_errors_are_propagated() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let err = document
        .embedded_text(&FailingFont, "?", attrs! {})
        .expect_err("the font has no glyphs");
    assert!(matches!(err, Error::Font(_)));
    assert_eq!(err.to_string(), "font engine error: no glyph for `?`");
    assert!(document.glyph_ids().is_empty());
    Ok(())
}

#[test]
fn placed_groups_reject_transforms() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let result = document.embedded_text(&MonoFont, "a", attrs! { transform: "scale(2)" });
    assert!(matches!(result, Err(Error::InvalidValue { name, .. }) if name == "transform"));
    assert_eq!(document.root().child_count(), 1);
    Ok(())
}
