/*!
 * Mutable XML tree used for document surgery.
 *
 * The tree follows the text/tail model: an element owns the text that
 * precedes its first child, and every child node owns the text that follows
 * it up to the next sibling (its tail). Mixed content therefore maps onto a
 * flat `Vec<Node>` with no separate text nodes, which keeps child indices
 * stable while text runs are rewritten.
 */

use super::XliffVersion;
use super::walker;

/// Namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A single attribute, name kept exactly as written (prefix included)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Nested element, carries its own tail
    Element(Element),
    /// `<!-- ... -->`
    Comment { content: String, tail: String },
    /// `<? ... ?>`
    Instruction { content: String, tail: String },
}

impl Node {
    /// Text following this node inside its parent
    pub fn tail(&self) -> &str {
        match self {
            Node::Element(element) => &element.tail,
            Node::Comment { tail, .. } | Node::Instruction { tail, .. } => tail,
        }
    }

    pub fn tail_mut(&mut self) -> &mut String {
        match self {
            Node::Element(element) => &mut element.tail,
            Node::Comment { tail, .. } | Node::Instruction { tail, .. } => tail,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Clone of this node with the tail cleared
    pub fn detached(&self) -> Node {
        let mut node = self.clone();
        node.tail_mut().clear();
        node
    }
}

/// An XML element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name as written, e.g. `source` or `xlf:source`
    pub name: String,
    /// Resolved namespace URI, if any
    pub namespace: Option<String>,
    /// Attributes in document order, namespace declarations included
    pub attributes: Vec<Attribute>,
    /// Text before the first child
    pub text: String,
    /// Child nodes in document order
    pub children: Vec<Node>,
    /// Text after the end tag, owned by the parent's content
    pub tail: String,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            ..Default::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style text setter
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Name without prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Prefix of the qualified name
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Whether the local name matches, ignoring namespace
    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Value of the `xml:space` attribute when it says `preserve`
    pub fn preserves_space(&self) -> bool {
        self.attribute("xml:space") == Some("preserve")
    }

    /// Child elements with their index in `children`
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.as_element().map(|element| (index, element)))
    }

    /// Index of the first child element with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<usize> {
        self.child_elements()
            .find(|(_, element)| element.is(local_name))
            .map(|(index, _)| index)
    }

    pub fn child_element(&self, index: usize) -> Option<&Element> {
        self.children.get(index).and_then(Node::as_element)
    }

    pub fn child_element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index).and_then(Node::as_element_mut)
    }

    /// Follow a path of child indices from this element
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, &index| element.child_element(index))
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.child_element_mut(index)?;
        }
        Some(current)
    }

    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|node| node.as_element().is_some())
    }

    /// Whether element children share this element with non-whitespace text
    pub fn has_mixed_content(&self) -> bool {
        self.has_element_children()
            && (!self.text.trim().is_empty()
                || self.children.iter().any(|node| !node.tail().trim().is_empty()))
    }

    /// Concatenated text of this element and its descendants, tails of
    /// descendants included, own tail excluded
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for node in &self.children {
            if let Node::Element(child) = node {
                out.push_str(&child.text_content());
            }
            out.push_str(node.tail());
        }
        out
    }
}

/// Top-level items outside the root element
#[derive(Debug, Clone, PartialEq)]
pub enum Misc {
    Comment(String),
    Instruction(String),
    DocType(String),
}

/// A parsed XLIFF document
#[derive(Debug, Clone)]
pub struct Document {
    pub prolog: Vec<Misc>,
    pub root: Element,
    pub epilog: Vec<Misc>,
    version: XliffVersion,
}

impl Document {
    /// Wrap a root element; the schema version is fixed here
    pub fn new(prolog: Vec<Misc>, root: Element, epilog: Vec<Misc>) -> Self {
        let version = walker::detect_version(&root);
        Self {
            prolog,
            root,
            epilog,
            version,
        }
    }

    pub fn from_root(root: Element) -> Self {
        Self::new(Vec::new(), root, Vec::new())
    }

    /// Schema generation detected at load time
    pub fn version(&self) -> XliffVersion {
        self.version
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        self.root.element_at(path)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        self.root.element_at_mut(path)
    }
}
