//! The arena used to allocate nodes and documents
use std::cell::Cell;

use crate::{
    attribute::Attributes,
    document::Data,
    name::QualName,
    node::{Node, Ref},
};

/// An arena for the nodes of one or more documents.
///
/// Everything allocated lives as long as the arena, so handles into a document are cheap to copy.
///
/// ```
/// use oxplot_ast::{arena::Arena, document::Document, attrs};
///
/// let arena = Arena::new();
/// let document = Document::new(&arena, attrs! { width: 150, height: 150 })?;
/// assert_eq!(document.width()?, 150);
/// # Ok::<(), oxplot_ast::error::Error>(())
/// ```
pub struct Arena<'arena> {
    /// The arena for new nodes
    nodes: typed_arena::Arena<Node<'arena>>,
    /// The arena for the data shared between copies of a document
    documents: typed_arena::Arena<Data<'arena>>,
    /// Incrementally counts the number of allocated nodes to assign as the id of allocated nodes
    current_node_id: Cell<usize>,
}

impl<'arena> Arena<'arena> {
    /// Creates an empty arena
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    /// Creates an empty arena with space for `n` nodes before reallocating
    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: typed_arena::Arena::with_capacity(n),
            documents: typed_arena::Arena::new(),
            current_node_id: Cell::new(0),
        }
    }

    /// Returns the number of nodes allocated so far
    pub fn len(&self) -> usize {
        self.current_node_id.get()
    }

    /// Returns whether no nodes have been allocated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates a detached node with the given name and attributes
    pub(crate) fn alloc(&'arena self, tag: QualName, attributes: Attributes) -> Ref<'arena> {
        let id = self.current_node_id.get();
        self.current_node_id.set(id + 1);
        self.nodes.alloc(Node::new(id, tag, attributes))
    }

    pub(crate) fn alloc_document(&'arena self, data: Data<'arena>) -> &'arena Data<'arena> {
        self.documents.alloc(data)
    }
}

impl Default for Arena<'_> {
    fn default() -> Self {
        Self::new()
    }
}
