//! Parsed GIR document held as a single arena.
//!
//! Every element and text run becomes one entry in a flat `Vec`, in document
//! order. Parents are stored as indices, so walking up the ancestor chain is a
//! plain lookup and a `Node` handle is just `(&document, index)`.

use crate::error::{GirError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable GIR document. Qualified names (`glib:signal`,
/// `c:identifier`) are stored exactly as written.
#[derive(Debug)]
pub struct GirDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl GirDocument {
    /// Read and parse a GIR file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GirError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse GIR XML from a string.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let event = reader.read_event().map_err(|e| GirError::Xml {
                position: reader.error_position() as u64,
                message: e.to_string(),
            })?;
            match event {
                Event::Start(start) => {
                    let id = push_element(&mut nodes, &stack, &start, reader.buffer_position() as u64)?;
                    if stack.is_empty() {
                        check_single_root(&mut root, id, reader.buffer_position() as u64)?;
                    }
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let id = push_element(&mut nodes, &stack, &start, reader.buffer_position() as u64)?;
                    if stack.is_empty() {
                        check_single_root(&mut root, id, reader.buffer_position() as u64)?;
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| GirError::Xml {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })?;
                    push_text(&mut nodes, &stack, &text);
                }
                Event::CData(data) => {
                    push_text(&mut nodes, &stack, &String::from_utf8_lossy(&data));
                }
                Event::Eof => break,
                // declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(GirError::Xml {
                position: reader.buffer_position() as u64,
                message: format!("unclosed element <{}>", element_tag(&nodes, *open)),
            });
        }
        let root = root.ok_or_else(|| GirError::Xml {
            position: 0,
            message: "document has no root element".to_string(),
        })?;

        Ok(GirDocument { nodes, root })
    }

    /// The outermost element, `<repository>` for a real GIR file.
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { doc: self, id }
    }

    /// All elements named `tag`, in document order.
    pub fn descendants_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Node<'a>> + 'a {
        (0..self.nodes.len())
            .map(move |i| self.node(NodeId(i)))
            .filter(move |n| n.tag() == Some(tag))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn check_single_root(root: &mut Option<NodeId>, id: NodeId, position: u64) -> Result<()> {
    if root.is_some() {
        return Err(GirError::Xml {
            position,
            message: "multiple root elements".to_string(),
        });
    }
    *root = Some(id);
    Ok(())
}

fn push_element(
    nodes: &mut Vec<NodeData>,
    stack: &[NodeId],
    start: &BytesStart<'_>,
    position: u64,
) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| GirError::Xml {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| GirError::Xml {
            position,
            message: e.to_string(),
        })?;
        attrs.push((key, value.into_owned()));
    }
    Ok(push_node(nodes, stack, NodeKind::Element { tag, attrs }))
}

fn push_text(nodes: &mut Vec<NodeData>, stack: &[NodeId], text: &str) {
    // text outside the root element carries nothing
    let Some(&parent) = stack.last() else {
        return;
    };
    if let Some(&last) = nodes[parent.0].children.last() {
        if let NodeKind::Text(ref mut existing) = nodes[last.0].kind {
            existing.push_str(text);
            return;
        }
    }
    push_node(nodes, stack, NodeKind::Text(text.to_string()));
}

fn push_node(nodes: &mut Vec<NodeData>, stack: &[NodeId], kind: NodeKind) -> NodeId {
    let id = NodeId(nodes.len());
    let parent = stack.last().copied();
    nodes.push(NodeData {
        kind,
        parent,
        children: Vec::new(),
    });
    if let Some(parent) = parent {
        nodes[parent.0].children.push(id);
    }
    id
}

fn element_tag(nodes: &[NodeData], id: NodeId) -> &str {
    match &nodes[id.0].kind {
        NodeKind::Element { tag, .. } => tag,
        NodeKind::Text(_) => "#text",
    }
}

/// Borrowed handle to one node of a [`GirDocument`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    doc: &'a GirDocument,
    id: NodeId,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Element tag name; `None` for text nodes.
    pub fn tag(&self) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data().kind, NodeKind::Text(_))
    }

    /// Text content of a text node.
    pub fn text(&self) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Attribute value by qualified name. GIR never distinguishes an empty
    /// attribute from a missing one, so empty values read as `None`.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match &self.data().kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| self.doc.node(id))
    }

    /// Parent, grandparent, … up to the root element.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| doc.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn first_child(&self) -> Option<Node<'a>> {
        self.children().next()
    }

    pub fn first_child_element(&self, tag: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.is_tag(tag))
    }

    /// Text of the first child, if that child is a text node.
    pub fn first_text(&self) -> Option<&'a str> {
        self.first_child().and_then(|c| c.text())
    }
}
