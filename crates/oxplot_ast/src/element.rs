//! The factory every element of a document is constructed through.
use crate::{
    attribute::{normalize, Options},
    document::Document,
    error::Error,
    name::QualName,
    node::Ref,
};

/// Creates an element and attaches it as the last child of the parent given in `options`.
///
/// The options are normalized into attributes, and the wiring keys `parent` and `root` are never
/// written as attributes.
///
/// # Errors
/// - When no parent is given
/// - When the parent belongs to another document
/// - When the tag or an attribute name is not a valid markup name
pub fn create<'arena>(
    document: Document<'arena>,
    tag: &str,
    options: Options<'arena>,
) -> Result<Ref<'arena>, Error> {
    let (attributes, parent) = options.into_parts();
    let name = QualName::parse(tag)?;
    let Some(parent) = parent else {
        return Err(Error::MissingParent {
            tag: tag.to_string(),
        });
    };
    if !document.owns(parent) {
        return Err(Error::ForeignParent {
            tag: tag.to_string(),
        });
    }
    let attributes = normalize(attributes)?;

    let node = document.arena().alloc(name, attributes);
    parent.append_child(node);
    log::debug!(
        "created <{tag}> #{} under <{}> #{}",
        node.id(),
        parent.tag(),
        parent.id()
    );
    Ok(node)
}

#[cfg(test)]
use crate::{arena::Arena, attrs};

#[test]
fn create_requires_a_parent() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let before = arena.len();

    let result = create(document, "rect", attrs! { x: 0 });
    assert!(matches!(result, Err(Error::MissingParent { tag }) if tag == "rect"));
    assert_eq!(arena.len(), before, "nothing is allocated for a failed element");
    Ok(())
}

#[test]
fn create_rejects_foreign_parents() -> anyhow::Result<()> {
    let arena = Arena::new();
    let first = Document::new(&arena, attrs! {})?;
    let second = Document::new(&arena, attrs! {})?;

    let result = create(second, "rect", attrs! {}.parent(first.root()));
    assert!(matches!(result, Err(Error::ForeignParent { .. })));
    assert_eq!(first.root().child_count(), 1, "only the defs are present");
    Ok(())
}

#[test]
fn create_rejects_invalid_names() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;

    let result = create(document, "not a tag", attrs! {}.parent(document.root()));
    assert!(matches!(result, Err(Error::InvalidElement { .. })));
    let result = create(
        document,
        "rect",
        attrs! {}.with("bad name", 1).parent(document.root()),
    );
    assert!(matches!(result, Err(Error::InvalidElement { .. })));
    assert_eq!(document.root().child_count(), 1);
    Ok(())
}

#[test]
fn create_appends_in_order() -> anyhow::Result<()> {
    let arena = Arena::new();
    let document = Document::new(&arena, attrs! {})?;
    let root = document.root();

    let rect = create(document, "rect", attrs! { stroke_width: 5 }.parent(root))?;
    let circle = create(document, "circle", attrs! {}.parent(root))?;
    let tags: Vec<_> = root.children().map(|n| n.tag().to_string()).collect();
    assert_eq!(tags, ["defs", "rect", "circle"]);
    assert!(rect.parent_node().is_some_and(|p| p.ptr_eq(root)));
    assert!(circle.previous_sibling().is_some_and(|p| p.ptr_eq(rect)));
    assert!(rect.has_attribute("stroke-width"));
    Ok(())
}
