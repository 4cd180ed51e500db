//! A small arena-backed XML tree on top of `quick-xml`.
//!
//! Elements are addressed by [`NodeId`], an index into the document's element
//! store. Text, attribute values, comments and the like are kept in their raw
//! (escaped) written form so that an unmodified tree serializes back to the
//! bytes it was parsed from.
//!
//! Accessors taking a [`NodeId`] panic if the id was not produced by the same
//! document, like slice indexing.

use std::{borrow::Cow, io::Write};

use quick_xml::{
    Reader, Writer,
    escape::{escape, partial_escape, unescape},
    events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event},
};

use crate::{error::Error, parse_options::ParseOptions};

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(NodeId),
    /// Character data, escaped as written.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl Node {
    fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(raw) if raw.chars().all(char::is_whitespace))
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    /// Attribute name and raw (escaped) value pairs, in written order.
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    parent: Option<NodeId>,
    self_closing: bool,
}

/// The `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
        }
    }
}

impl Declaration {
    fn from_event(decl: &BytesDecl) -> Result<Self, Error> {
        let version = decode(&decl.version()?)?;
        let encoding = decl
            .encoding()
            .transpose()
            .map_err(quick_xml::Error::InvalidAttr)?
            .map(|e| decode(&e))
            .transpose()?;
        let standalone = decl
            .standalone()
            .transpose()
            .map_err(quick_xml::Error::InvalidAttr)?
            .map(|s| decode(&s))
            .transpose()?;
        Ok(Self {
            version,
            encoding,
            standalone,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    declaration: Declaration,
    /// Top-level nodes: the root element plus any surrounding whitespace, comments, etc.
    nodes: Vec<Node>,
    store: Vec<Element>,
}

impl Document {
    /// Parses a document from raw bytes.
    pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<Self, Error> {
        let mut reader = Reader::from_reader(bytes);
        let mut document = Document::default();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Decl(e) => document.declaration = Declaration::from_event(&e)?,
                Event::Start(e) => {
                    let id = document.open_element(&e, stack.last().copied(), false, options)?;
                    stack.push(id);
                }
                Event::Empty(e) => {
                    document.open_element(&e, stack.last().copied(), true, options)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(e) => {
                    let raw = decode(&e)?;
                    if options.preserve_whitespace || !raw.trim().is_empty() {
                        let unescaped = unescape_raw(&raw)?;
                        let raw = if options.preserve_character_references {
                            raw
                        } else {
                            partial_escape(&unescaped).into_owned()
                        };
                        document.append(stack.last().copied(), Node::Text(raw));
                    }
                }
                Event::CData(e) => document.append(stack.last().copied(), Node::CData(decode(&e)?)),
                Event::Comment(e) => {
                    document.append(stack.last().copied(), Node::Comment(decode(&e)?))
                }
                Event::PI(e) => document.append(
                    stack.last().copied(),
                    Node::ProcessingInstruction(decode(&e)?),
                ),
                Event::DocType(e) => {
                    document.append(stack.last().copied(), Node::DocType(decode(&e)?))
                }
                Event::Eof => break,
            }
            buf.clear();
        }

        if let Some(&open) = stack.last() {
            return Err(Error::format_error(
                document.path(open),
                "element is never closed",
            ));
        }
        Ok(document)
    }

    fn open_element(
        &mut self,
        start: &BytesStart,
        parent: Option<NodeId>,
        self_closing: bool,
        options: &ParseOptions,
    ) -> Result<NodeId, Error> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
            let key = decode(attr.key.as_ref())?;
            let raw = decode(&attr.value)?;
            let unescaped = unescape_raw(&raw)?;
            let raw = if options.preserve_character_references {
                // Values are always written back inside double quotes.
                raw.replace('"', "&quot;")
            } else {
                escape(&unescaped).into_owned()
            };
            attributes.push((key, raw));
        }

        let id = self.store.len();
        self.store.push(Element {
            name: decode(start.name().as_ref())?,
            attributes,
            children: Vec::new(),
            parent,
            self_closing,
        });
        self.append(parent, Node::Element(id));
        Ok(id)
    }

    fn append(&mut self, parent: Option<NodeId>, node: Node) {
        match parent {
            Some(id) => self.store[id].children.push(node),
            None => self.nodes.push(node),
        }
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    /// Controls the `standalone` pseudo-attribute of the declaration.
    /// `false` omits it entirely.
    pub fn set_standalone(&mut self, standalone: bool) {
        self.declaration.standalone = standalone.then(|| "yes".to_string());
    }

    pub fn root_element(&self) -> Option<NodeId> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(id) => Some(*id),
            _ => None,
        })
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.store[node].name
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.store[node].parent
    }

    pub fn children(&self, node: NodeId) -> &[Node] {
        &self.store[node].children
    }

    pub fn child_elements_named(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        self.store[node]
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Element(id) if self.store[*id].name == name => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Follows a relative `a/b/c` path of element names, collecting every match in document order.
    pub fn select_descendants(&self, node: NodeId, path: &str) -> Vec<NodeId> {
        path.split('/')
            .filter(|step| !step.is_empty())
            .fold(vec![node], |current, step| {
                current
                    .into_iter()
                    .flat_map(|id| self.child_elements_named(id, step))
                    .collect()
            })
    }

    /// Returns the unescaped value of an attribute.
    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, Error> {
        self.store[node]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, raw)| unescape_raw(raw))
            .transpose()
    }

    /// Sets an attribute, escaping `value`. Existing attributes keep their position.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let raw = escape(value).into_owned();
        let attributes = &mut self.store[node].attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = raw,
            None => attributes.push((name.to_string(), raw)),
        }
    }

    /// Concatenated, unescaped character data of an element and its descendants.
    pub fn text(&self, node: NodeId) -> Result<String, Error> {
        let mut out = String::new();
        self.collect_text(node, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) -> Result<(), Error> {
        for child in &self.store[node].children {
            match child {
                Node::Text(raw) => out.push_str(&unescape_raw(raw)?),
                Node::CData(raw) => out.push_str(raw),
                Node::Element(id) => self.collect_text(*id, out)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Creates a detached element; attach it with [`Document::add_child`] or
    /// [`Document::insert_child`].
    pub fn new_element(&mut self, name: &str) -> NodeId {
        self.store.push(Element {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            self_closing: false,
        });
        self.store.len() - 1
    }

    pub fn add_child(&mut self, parent: NodeId, node: Node) {
        let index = self.store[parent].children.len();
        self.insert_child(parent, index, node);
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, node: Node) {
        if let Node::Element(id) = node {
            self.store[id].parent = Some(parent);
        }
        self.store[parent].children.insert(index, node);
    }

    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Option<Node> {
        let children = &mut self.store[parent].children;
        if index >= children.len() {
            return None;
        }
        let node = children.remove(index);
        if let Node::Element(id) = node {
            self.store[id].parent = None;
        }
        Some(node)
    }

    /// Sets or removes the text-only child element `child_name` of `element`.
    ///
    /// - `Some(value)` on an existing child replaces its content.
    /// - `Some(value)` without a child creates one right after the first
    ///   `insert_after` sibling, copying that sibling's leading indentation.
    ///   Without such a sibling the child is appended.
    /// - `None` removes the child together with its leading indentation.
    pub fn apply_edit(
        &mut self,
        element: NodeId,
        child_name: &str,
        value: Option<&str>,
        insert_after: &str,
    ) {
        let position = self.child_position(element, child_name);
        match (position, value) {
            (Some(index), Some(value)) => {
                if let Node::Element(child) = self.store[element].children[index] {
                    let child = &mut self.store[child];
                    child.children = vec![Node::Text(partial_escape(value).into_owned())];
                    child.self_closing = false;
                }
            }
            (Some(index), None) => {
                self.remove_child(element, index);
                if index > 0 && self.store[element].children[index - 1].is_whitespace() {
                    self.remove_child(element, index - 1);
                }
            }
            (None, Some(value)) => {
                let child = self.new_element(child_name);
                self.add_child(child, Node::Text(partial_escape(value).into_owned()));
                match self.child_position(element, insert_after) {
                    Some(anchor) => {
                        let children = &self.store[element].children;
                        let indent = (anchor > 0 && children[anchor - 1].is_whitespace())
                            .then(|| children[anchor - 1].clone());
                        let mut index = anchor + 1;
                        if let Some(indent) = indent {
                            self.insert_child(element, index, indent);
                            index += 1;
                        }
                        self.insert_child(element, index, Node::Element(child));
                    }
                    None => self.add_child(element, Node::Element(child)),
                }
            }
            (None, None) => {}
        }
    }

    fn child_position(&self, element: NodeId, name: &str) -> Option<usize> {
        self.store[element]
            .children
            .iter()
            .position(|child| matches!(child, Node::Element(id) if self.store[*id].name == name))
    }

    /// XPath-like location of an element, e.g. `/xliff/file[2]/body/trans-unit[5]`.
    ///
    /// Positions are 1-based and only written when the parent has more than
    /// one child element of the same name.
    pub fn path(&self, node: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let element = &self.store[id];
            let segment = match element.parent {
                Some(parent) => {
                    let siblings = self.child_elements_named(parent, &element.name);
                    match siblings.iter().position(|&sibling| sibling == id) {
                        Some(position) if siblings.len() > 1 => {
                            format!("{}[{}]", element.name, position + 1)
                        }
                        _ => element.name.clone(),
                    }
                }
                None => element.name.clone(),
            };
            segments.push(segment);
            current = element.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Serializes the whole tree, declaration first.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new(
            &self.declaration.version,
            self.declaration.encoding.as_deref(),
            self.declaration.standalone.as_deref(),
        )))?;
        for node in &self.nodes {
            self.write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, node: &Node) -> Result<(), Error> {
        match node {
            Node::Element(id) => {
                let element = &self.store[*id];
                let mut start = BytesStart::new(element.name.as_str());
                for (key, raw) in &element.attributes {
                    start.push_attribute((key.as_bytes(), raw.as_bytes()));
                }
                if element.self_closing && element.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for child in &element.children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
                }
            }
            Node::Text(raw) => {
                writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?
            }
            Node::CData(raw) => writer.write_event(Event::CData(BytesCData::new(raw.as_str())))?,
            Node::Comment(raw) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?
            }
            Node::ProcessingInstruction(raw) => {
                writer.write_event(Event::PI(BytesPI::new(raw.as_str())))?
            }
            Node::DocType(raw) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(raw.as_str())))?
            }
        }
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(Error::unreadable)
}

fn unescape_raw(raw: &str) -> Result<String, Error> {
    unescape(raw)
        .map(Cow::into_owned)
        .map_err(|e| Error::XmlParse(quick_xml::Error::Escape(e)))
}
