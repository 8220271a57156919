//! Nodes of a document tree.
use std::cell::{self, Cell, RefCell};

use crate::{
    attribute::{mangle, Attributes, Value, RESERVED_KEYS},
    error::Error,
    name::QualName,
};

/// A reference to a node
pub type Ref<'arena> = &'arena Node<'arena>;
/// A settable reference to a node
pub type Link<'arena> = Cell<Option<Ref<'arena>>>;

#[derive(derive_more::Debug)]
/// An element of a document.
///
/// Nodes are attached to their parent as they're created and cannot be moved afterwards, so the
/// order of children is always the order they were constructed in.
pub struct Node<'arena> {
    /// The order the node was allocated in its arena
    id: usize,
    /// The qualified name of the element's tag.
    tag: QualName,
    /// The attributes of the element.
    attributes: RefCell<Attributes>,
    /// Text before the first child
    text: RefCell<Option<String>>,
    /// Text after the closing tag, before the next sibling
    tail: RefCell<Option<String>>,
    #[debug(skip)]
    /// The node's parent.
    parent: Link<'arena>,
    #[debug(skip)]
    /// The node after this of the node's parent's children
    next_sibling: Link<'arena>,
    #[debug(skip)]
    /// The node before this of the node's parent's children
    previous_sibling: Link<'arena>,
    #[debug(skip)]
    /// The node's first child.
    first_child: Link<'arena>,
    #[debug(skip)]
    /// The node's last child.
    last_child: Link<'arena>,
}

impl<'arena> Node<'arena> {
    pub(crate) fn new(id: usize, tag: QualName, attributes: Attributes) -> Self {
        Self {
            id,
            tag,
            attributes: RefCell::new(attributes),
            text: RefCell::new(None),
            tail: RefCell::new(None),
            parent: Cell::new(None),
            next_sibling: Cell::new(None),
            previous_sibling: Cell::new(None),
            first_child: Cell::new(None),
            last_child: Cell::new(None),
        }
    }

    /// Returns the unique id of the node within its arena
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the qualified name of the element's tag
    pub fn tag(&self) -> &QualName {
        &self.tag
    }

    /// Returns a view of the attributes of the element.
    ///
    /// # Panics
    /// If the attributes are being modified at the same time
    pub fn attributes(&self) -> cell::Ref<'_, Attributes> {
        self.attributes.borrow()
    }

    /// Returns a copy of the value of the named attribute
    pub fn get_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Returns whether the named attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.borrow().contains(name)
    }

    /// Sets an attribute by its semantic key, returning the previous value.
    ///
    /// The key is mangled the same way as the options of a constructor, and reserved wiring keys
    /// are ignored.
    ///
    /// # Errors
    /// When the mangled key is not a valid markup name
    pub fn set_attribute(&self, key: &str, value: impl Into<Value>) -> Result<Option<Value>, Error> {
        let name = mangle(key);
        if RESERVED_KEYS.contains(&name.as_ref()) {
            log::debug!("ignoring reserved attribute `{name}` on <{}>", self.tag);
            return Ok(None);
        }
        let name = QualName::parse(&name)?;
        Ok(self.attributes.borrow_mut().insert(name, value.into()))
    }

    /// Removes an attribute by its markup name, returning its value
    pub fn remove_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.borrow_mut().remove(name)
    }

    /// Returns the text before the element's first child
    pub fn text(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    /// Sets the text before the element's first child
    pub fn set_text(&self, text: impl Into<String>) {
        self.text.replace(Some(text.into()));
    }

    /// Returns the text following the element's closing tag
    pub fn tail(&self) -> Option<String> {
        self.tail.borrow().clone()
    }

    /// Sets the text following the element's closing tag
    pub fn set_tail(&self, tail: impl Into<String>) {
        self.tail.replace(Some(tail.into()));
    }

    /// Returns the node this was attached to, if any
    pub fn parent_node(&self) -> Option<Ref<'arena>> {
        self.parent.get()
    }

    /// Returns the first child
    pub fn first_child(&self) -> Option<Ref<'arena>> {
        self.first_child.get()
    }

    /// Returns the last child
    pub fn last_child(&self) -> Option<Ref<'arena>> {
        self.last_child.get()
    }

    /// Returns the next sibling
    pub fn next_sibling(&self) -> Option<Ref<'arena>> {
        self.next_sibling.get()
    }

    /// Returns the previous sibling
    pub fn previous_sibling(&self) -> Option<Ref<'arena>> {
        self.previous_sibling.get()
    }

    /// Returns an iterator over the children in the order they were attached
    pub fn children(&self) -> Children<'arena> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    /// Returns the number of children
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Returns every node beneath this one in document order, not including itself
    pub fn descendants(&self) -> Descendants<'arena> {
        Descendants {
            stack: self.children().rev().collect(),
        }
    }

    /// Returns whether both references point to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    /// Returns the top-most ancestor, or itself when detached
    pub(crate) fn top(&'arena self) -> Ref<'arena> {
        let mut current = self;
        while let Some(parent) = current.parent_node() {
            current = parent;
        }
        current
    }

    /// Attaches a newly allocated node as the last child
    pub(crate) fn append_child(&'arena self, child: Ref<'arena>) {
        debug_assert!(child.parent_node().is_none());
        child.parent.set(Some(self));
        if let Some(last) = self.last_child.get() {
            last.next_sibling.set(Some(child));
            child.previous_sibling.set(Some(last));
        } else {
            self.first_child.set(Some(child));
        }
        self.last_child.set(Some(child));
    }
}

/// An iterator over the children of a node
pub struct Children<'arena> {
    front: Option<Ref<'arena>>,
    back: Option<Ref<'arena>>,
}

impl<'arena> Iterator for Children<'arena> {
    type Item = Ref<'arena>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.front?;
        if self.back.is_some_and(|back| back.ptr_eq(current)) {
            self.front = None;
            self.back = None;
        } else {
            self.front = current.next_sibling();
        }
        Some(current)
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.back?;
        if self.front.is_some_and(|front| front.ptr_eq(current)) {
            self.front = None;
            self.back = None;
        } else {
            self.back = current.previous_sibling();
        }
        Some(current)
    }
}

/// A pre-order iterator over the nodes beneath a node
pub struct Descendants<'arena> {
    stack: Vec<Ref<'arena>>,
}

impl<'arena> Iterator for Descendants<'arena> {
    type Item = Ref<'arena>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.children().rev());
        Some(current)
    }
}

#[cfg(test)]
fn tree<'arena>(arena: &'arena crate::arena::Arena<'arena>) -> anyhow::Result<Ref<'arena>> {
    let alloc = |tag: &str| -> anyhow::Result<Ref<'arena>> {
        Ok(arena.alloc(QualName::parse(tag)?, Attributes::new()))
    };
    let svg = alloc("svg")?;
    let g = alloc("g")?;
    svg.append_child(g);
    g.append_child(alloc("line")?);
    g.append_child(alloc("circle")?);
    svg.append_child(alloc("rect")?);
    Ok(svg)
}

#[cfg(test)]
fn tags<'arena>(iter: impl Iterator<Item = Ref<'arena>>) -> Vec<String> {
    iter.map(|node| node.tag().to_string()).collect()
}

#[test]
fn children_keep_construction_order() -> anyhow::Result<()> {
    let arena = crate::arena::Arena::new();
    let svg = tree(&arena)?;

    assert_eq!(tags(svg.children()), ["g", "rect"]);
    assert_eq!(tags(svg.children().rev()), ["rect", "g"]);
    assert_eq!(tags(svg.descendants()), ["g", "line", "circle", "rect"]);
    assert_eq!(svg.child_count(), 2);

    let line = svg.descendants().nth(1).ok_or(anyhow::anyhow!("missing line"))?;
    assert!(line.top().ptr_eq(svg));
    assert!(line.parent_node().is_some_and(|g| g.tag().matches("g")));
    assert!(line.next_sibling().is_some_and(|c| c.tag().matches("circle")));
    assert!(line.previous_sibling().is_none());
    Ok(())
}

#[test]
fn mixed_iteration_meets_in_the_middle() -> anyhow::Result<()> {
    let arena = crate::arena::Arena::new();
    let svg = tree(&arena)?;
    let g = svg.first_child().ok_or(anyhow::anyhow!("missing g"))?;

    let mut children = g.children();
    assert!(children.next().is_some_and(|n| n.tag().matches("line")));
    assert!(children.next_back().is_some_and(|n| n.tag().matches("circle")));
    assert!(children.next().is_none());
    assert!(children.next_back().is_none());
    Ok(())
}

#[test]
fn attribute_accessors() -> anyhow::Result<()> {
    let arena = crate::arena::Arena::new();
    let svg = tree(&arena)?;

    assert_eq!(svg.set_attribute("stroke_width", 5)?, None);
    assert_eq!(svg.set_attribute("stroke-width", 6)?, Some(Value::Integer(5)));
    assert_eq!(svg.set_attribute("root", "ignored")?, None);
    assert!(svg.set_attribute("not valid", 1).is_err());

    assert!(svg.has_attribute("stroke-width"));
    assert!(!svg.has_attribute("root"));
    assert_eq!(svg.attributes().len(), 1);
    assert_eq!(svg.remove_attribute("stroke-width"), Some(Value::Integer(6)));
    assert!(svg.attributes().is_empty());

    assert_eq!(svg.text(), None);
    svg.set_text("hello");
    svg.set_tail("world");
    assert_eq!(svg.text().as_deref(), Some("hello"));
    assert_eq!(svg.tail().as_deref(), Some("world"));
    Ok(())
}
