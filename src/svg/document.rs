//! Owned, mutable SVG element tree.

use std::collections::HashMap;

use crate::error::OverlayError;
use crate::svg::style;

/// Index of a node inside an [`SvgDocument`].
///
/// Ids are assigned in document order, so comparing two ids compares their
/// position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single attribute as written in the source (qualified name, raw value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name, e.g. `stroke` or `inkscape:label`
    pub name: String,
    /// Unescaped value
    pub value: String,
}

/// An SVG element with its attributes and the namespaces it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    local_name: String,
    attributes: Vec<Attribute>,
    namespaces: Vec<(Option<String>, String)>,
}

impl Element {
    /// Creates a bare element with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let local_name = name
            .rsplit_once(':')
            .map_or_else(|| name.clone(), |(_, local)| local.to_string());
        Self {
            name,
            local_name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Qualified tag name as written in the source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without its namespace prefix (`rect`, `g`, `text`).
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// All attributes in source order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Namespace declarations introduced on this element (`None` = default namespace).
    pub fn namespaces(&self) -> &[(Option<String>, String)] {
        &self.namespaces
    }

    /// Returns the value of an attribute by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// The element's `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Checks whether the whitespace-separated `class` list contains `token`.
    pub fn has_class(&self, token: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|class| class == token))
    }

    /// Resolves a presentation property, preferring the inline `style` declaration.
    pub fn presentation(&self, property: &str) -> Option<String> {
        self.attribute("style")
            .and_then(|inline| style::declaration(inline, property))
            .or_else(|| self.attribute(property).map(str::to_string))
    }

    /// Sets a presentation property.
    ///
    /// The attribute is always written. An inline `style` declaration of the
    /// same property is rewritten too, otherwise it would keep overriding it.
    pub fn set_presentation(&mut self, property: &str, value: &str) {
        self.set_attribute(property, value);
        let rewritten = self
            .attribute("style")
            .and_then(|inline| style::replace_declaration(inline, property, value));
        if let Some(inline) = rewritten {
            self.set_attribute("style", inline);
        }
    }

    /// True when `display` resolves to `none`.
    pub fn is_hidden(&self) -> bool {
        self.presentation("display")
            .is_some_and(|display| display.trim() == "none")
    }
}

/// Content of a node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element
    Element(Element),
    /// Character data (already unescaped)
    Text(String),
    /// A comment, without the delimiters
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// A parsed SVG document.
///
/// Nodes are stored in document order in a flat arena; the root `<svg>`
/// element is always the first node. Element ids are indexed on parse. When
/// several elements share an id the first one in document order is indexed,
/// matching `getElementById`.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
}

impl SvgDocument {
    /// Parses SVG text.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Parse`] for malformed XML or when the root
    /// element is not `<svg>`.
    pub fn parse(text: &str) -> Result<Self, OverlayError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let xml = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| OverlayError::Parse(e.to_string()))?;

        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            return Err(OverlayError::Parse(format!(
                "root element is <{}>, expected <svg>",
                root.tag_name().name()
            )));
        }

        let mut document = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
        };
        document.import(root, None);
        Ok(document)
    }

    fn import(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<NodeId>) {
        let kind = match node.node_type() {
            roxmltree::NodeType::Element => NodeKind::Element(element_from_xml(node)),
            roxmltree::NodeType::Text => {
                NodeKind::Text(node.text().unwrap_or_default().to_string())
            }
            roxmltree::NodeType::Comment => {
                NodeKind::Comment(node.text().unwrap_or_default().to_string())
            }
            roxmltree::NodeType::Root | roxmltree::NodeType::PI => return,
        };

        let id = NodeId(self.nodes.len());
        if let NodeKind::Element(element) = &kind {
            if let Some(element_id) = element.id() {
                self.ids.entry(element_id.to_string()).or_insert(id);
            }
        }
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }

        for child in node.children() {
            self.import(child, Some(id));
        }
    }

    /// The root `<svg>` element.
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes (elements, text and comments).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A parsed document always has a root, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Content of a node.
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    /// Returns the element at `node`, or `None` for text/comment nodes.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node)? {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable access to the element at `node`.
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind)? {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Parent of `node`; `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Direct children of `node` in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Looks up an element by its `id` attribute (first match in document order).
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// All descendants of `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `node` whose local name is one of `names`.
    pub fn descendants_named(&self, node: NodeId, names: &[&str]) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&n| {
                self.element(n)
                    .is_some_and(|element| names.contains(&element.local_name()))
            })
            .collect()
    }

    /// Every element in the document, in document order.
    pub fn elements(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.nodes.iter().enumerate().filter_map(|(index, node)| match &node.kind {
            NodeKind::Element(element) => Some((NodeId(index), element)),
            _ => None,
        })
    }

    /// Concatenated text of all text descendants of `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Shows or hides an element through its `display` property.
    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> bool {
        match self.element_mut(node) {
            Some(element) => {
                element.set_presentation("display", if visible { "inline" } else { "none" });
                true
            }
            None => false,
        }
    }
}

/// Builds the qualified `prefix:local` name for a namespaced item.
fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn element_from_xml(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qualified_name(node, tag.namespace(), tag.name()));

    element.attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: qualified_name(node, attr.namespace(), attr.name()),
            value: attr.value().to_string(),
        })
        .collect();

    // Only declarations that are new relative to the parent are written back
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    element.namespaces = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    element
}
