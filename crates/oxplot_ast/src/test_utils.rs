//! Stand-ins for the font and formula engines.
use std::{cell::RefCell, collections::BTreeSet};

use crate::{
    attribute::Options,
    error::BoxError,
    formula::{FormulaGroup, FormulaParser, FormulaRenderer},
    glyph::{FontEngine, GlyphDefinition, GlyphRun},
};

/// The distance between glyphs of [`MonoFont`] and [`LeakyFont`]
const ADVANCE: f64 = 10.0;

fn glyph_id(char: char) -> String {
    format!("glyph-{}", u32::from(char))
}

fn outline(char: char) -> String {
    format!("M0 0h{}", u32::from(char))
}

/// A monospace font that only returns outlines for glyphs it wasn't told about
pub struct MonoFont;

impl FontEngine for MonoFont {
    fn glyphs_for(&self, text: &str, existing: &BTreeSet<String>) -> Result<GlyphRun, BoxError> {
        let mut run = LeakyFont.glyphs_for(text, existing)?;
        let mut seen = existing.clone();
        run.glyph_paths.retain(|glyph| seen.insert(glyph.id.clone()));
        Ok(run)
    }
}

/// A monospace font that returns an outline for every character, even repeated ones
pub struct LeakyFont;

impl FontEngine for LeakyFont {
    fn glyphs_for(&self, text: &str, _existing: &BTreeSet<String>) -> Result<GlyphRun, BoxError> {
        let mut run = GlyphRun::default();
        let mut x = 0.0;
        for char in text.chars() {
            run.x_positions.push(x);
            run.glyph_ids.push(glyph_id(char));
            run.glyph_paths.push(GlyphDefinition {
                id: glyph_id(char),
                path_data: outline(char),
            });
            x += ADVANCE;
        }
        Ok(run)
    }
}

/// A font without any glyphs
pub struct FailingFont;

impl FontEngine for FailingFont {
    fn glyphs_for(&self, text: &str, _existing: &BTreeSet<String>) -> Result<GlyphRun, BoxError> {
        Err(format!("no glyph for `{text}`").into())
    }
}

#[derive(Default)]
/// A parser that lays out each character of a formula side-by-side, recording how it was called
pub struct RecordingParser {
    pub calls: RefCell<Vec<(String, String, f64, f64)>>,
}

impl FormulaParser for RecordingParser {
    type Fonts = &'static str;
    type Layout = Vec<char>;

    fn parse(
        &self,
        text: &str,
        fonts: &Self::Fonts,
        size_pt: f64,
        dpi: f64,
    ) -> Result<Self::Layout, BoxError> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), (*fonts).to_string(), size_pt, dpi));
        Ok(text.chars().collect())
    }
}

/// A parser that rejects every formula
pub struct FailingParser;

impl FormulaParser for FailingParser {
    type Fonts = ();
    type Layout = Vec<char>;

    fn parse(&self, _: &str, (): &(), _: f64, _: f64) -> Result<Self::Layout, BoxError> {
        Err("unbalanced braces".into())
    }
}

/// Draws a reference for each character, followed by an underline
pub struct StackRenderer;

impl FormulaRenderer<Vec<char>> for StackRenderer {
    fn render(&self, target: FormulaGroup<'_>, layout: Vec<char>) -> Result<(), BoxError> {
        let mut x = 0.0;
        for char in &layout {
            target.r#use(
                Options::new()
                    .with("x", x)
                    .with("xlink:href", format!("#{}", glyph_id(*char))),
            )?;
            x += ADVANCE;
        }
        target.rect(
            Options::new()
                .with("y", 2)
                .with("width", x)
                .with("height", 1),
        )?;
        Ok(())
    }
}
