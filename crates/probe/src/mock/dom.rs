//! Arena-backed element tree rendered by the mock storefront.

use super::selector::SelectorList;

/// Index of a node in its document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One element in the tree
#[derive(Debug, Clone)]
pub struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    hidden: bool,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Lower-case tag name
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value, if present
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the `class` attribute lists `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Disabled form control
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Declarative element description used to build a [`Document`]
#[derive(Debug, Clone)]
pub struct El {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    hidden: bool,
    disabled: bool,
    children: Vec<El>,
}

impl El {
    /// Create an element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            hidden: false,
            disabled: false,
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Append a class
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        let classes = match self.attrs.iter().find(|(key, _)| key == "class") {
            Some((_, existing)) => format!("{existing} {class}"),
            None => class.to_string(),
        };
        self.attr("class", classes)
    }

    /// Set the element's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark as not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark as a disabled control
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children in order
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Rendered page
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Flatten an element description into an arena
    #[must_use]
    pub fn from_root(root: El) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.insert(root, None);
        doc
    }

    fn insert(&mut self, el: El, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: el.tag,
            attrs: el.attrs,
            text: el.text,
            hidden: el.hidden,
            disabled: el.disabled,
            parent,
            children: Vec::new(),
        });
        for child in el.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// Root element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for a document without elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        (index < self.nodes.len()).then_some(NodeId(index))
    }

    /// Node data
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Parent element
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Update an attribute in place (form state)
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attrs = &mut self.nodes[id.0].attrs;
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    /// Own text followed by descendant text, one line per non-empty piece
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut pieces = Vec::new();
        self.collect_text(id, &mut pieces);
        pieces.join("\n")
    }

    fn collect_text<'a>(&'a self, id: NodeId, out: &mut Vec<&'a str>) {
        let node = &self.nodes[id.0];
        if !node.text.is_empty() {
            out.push(&node.text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Rendered: neither the node nor any ancestor is hidden
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.nodes[current.0].hidden {
                return false;
            }
            cursor = self.nodes[current.0].parent;
        }
        true
    }

    /// Every element matching `selector` in document order, searching the
    /// whole document or only the descendants of `scope`
    #[must_use]
    pub fn query_all(&self, selector: &SelectorList, scope: Option<NodeId>) -> Vec<NodeId> {
        let mut candidates = Vec::new();
        match scope {
            Some(scope) => {
                for child in &self.nodes[scope.0].children {
                    self.collect_dfs(*child, &mut candidates);
                }
            }
            None => self.collect_dfs(self.root, &mut candidates),
        }
        candidates
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    fn collect_dfs(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in &self.nodes[id.0].children {
            self.collect_dfs(*child, out);
        }
    }
}
