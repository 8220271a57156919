//! A scene graph for building SVG documents.
//!
//! Elements are attached to their parent as they're constructed, through the constructors of a
//! [`container::Container`]. Attribute keys are written with `_` replaced by `-`, so
//! `stroke_width` becomes `stroke-width`.
//!
//! ```
//! use oxplot_ast::{arena::Arena, attrs, container::Shapes, document::Document};
//! use oxplot_ast::serialize::WriteOptions;
//!
//! let arena = Arena::new();
//! let document = Document::new(&arena, attrs! { width: 150, height: 150 })?;
//! document.rect(attrs! { x: 0, y: 0, width: 150, height: 150, stroke_width: 5 })?;
//!
//! let markup = document.to_string_with(&WriteOptions { header: false, ..Default::default() })?;
//! assert!(markup.ends_with(r#"<rect x="0" y="0" width="150" height="150" stroke-width="5"/></svg>"#));
//! # Ok::<(), oxplot_ast::error::Error>(())
//! ```
pub mod arena;
pub mod attribute;
pub mod container;
pub mod document;
pub mod element;
pub mod error;
pub mod formula;
pub mod glyph;
pub mod name;
pub mod node;
pub mod serialize;
pub mod transform;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
#[ctor::ctor]
fn init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}
