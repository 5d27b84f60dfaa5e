//! The element tree of an OFX body.

/// Index of a node within its [`Document`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Eq, PartialEq)]
struct NodeData {
    name: String,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable tree of named elements.
///
/// Nodes live in a single arena; parents are referenced by id so that lookups can walk upwards
/// without the tree owning itself.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Appends an element named `name` under `parent`, or at the top level.
    pub(crate) fn push(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.to_ascii_uppercase(),
            text: None,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(NodeId(p)) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Adds a text run to an element, separated by a space from any text already present.
    pub(crate) fn append_text(&mut self, NodeId(id): NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let slot = &mut self.nodes[id].text;
        match slot {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => *slot = Some(String::from(text)),
        }
    }

    pub(crate) fn name_of(&self, NodeId(id): NodeId) -> &str {
        &self.nodes[id].name
    }

    /// The top-level elements.
    pub fn roots(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.roots.iter().map(move |&id| Node { doc: self, id })
    }

    /// The first top-level element, normally `OFX`.
    pub fn root(&self) -> Option<Node<'_>> {
        self.roots().next()
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { doc: self, id }
    }

    /// Total number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First element named `name` across all top-level trees, in document order.
    pub fn first_descendant(&self, name: &str) -> Option<Node<'_>> {
        PreOrder::new(self, &self.roots).find(|n| n.is(name))
    }

    /// Every element named `name` across all top-level trees, in document order.
    pub fn all_descendants(&self, name: &str) -> Vec<Node<'_>> {
        PreOrder::new(self, &self.roots)
            .filter(|n| n.is(name))
            .collect()
    }
}

/// Depth-first pre-order walk over the subtrees rooted at a list of nodes.
///
/// Uses an explicit stack so that nesting depth is bounded by the heap, not the call stack.
struct PreOrder<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> PreOrder<'a> {
    fn new(doc: &'a Document, starts: &[NodeId]) -> Self {
        PreOrder {
            doc,
            stack: starts.iter().rev().copied().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Node<'a>> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.nodes[id.0].children.iter().rev().copied());
        Some(self.doc.node(id))
    }
}

/// A borrowed handle to an element of a [`Document`].
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The uppercased tag name.
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// Whether this element has the given tag name, ignoring case.
    pub fn is(&self, name: &str) -> bool {
        self.data().name.eq_ignore_ascii_case(name)
    }

    /// The decoded text content, if any.
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| self.doc.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| doc.node(id))
    }

    /// The first direct child named `name`.
    pub fn child(&self, name: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.is(name))
    }

    /// Text of the first direct child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&'a str> {
        self.child(name).and_then(|c| c.text())
    }

    /// First element named `name` below this one, depth-first pre-order.
    pub fn first_descendant(&self, name: &str) -> Option<Node<'a>> {
        PreOrder::new(self.doc, &self.data().children).find(|n| n.is(name))
    }

    /// Every element named `name` below this one, depth-first pre-order.
    pub fn all_descendants(&self, name: &str) -> Vec<Node<'a>> {
        PreOrder::new(self.doc, &self.data().children)
            .filter(|n| n.is(name))
            .collect()
    }

    /// The closest enclosing element named `name`.
    pub fn ancestor(&self, name: &str) -> Option<Node<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.is(name) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}
