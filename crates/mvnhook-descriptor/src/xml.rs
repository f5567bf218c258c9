//! Lossless XML tree built on quick-xml
//!
//! Text, comments and start-tag attribute text are stored exactly as they
//! appear in the source (still escaped), so an untouched tree writes back
//! byte-for-byte. Element names are matched by local name. A leading
//! byte-order mark is remembered and written back.

use crate::error::{ParseError, SerializeError};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

const BOM: char = '\u{feff}';

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped as in the source
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    /// Content of the `<?xml ...?>` declaration
    Declaration(String),
    DocType(String),
}

impl Node {
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(t) if t.chars().all(char::is_whitespace))
    }
}

/// An element with its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    /// Everything after the name inside the start tag
    attributes: String,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Create an empty element
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: String::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Create an element holding `value` as escaped text
    #[must_use]
    pub fn with_text(name: impl Into<String>, value: &str) -> Self {
        let mut el = Self::new(name);
        el.set_text(value);
        el
    }

    /// Append a child element (builder style, no indentation)
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.self_closing = false;
        self.children.push(Node::Element(child));
        self
    }

    /// Qualified name as written
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without namespace prefix
    #[inline]
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    #[inline]
    #[must_use]
    pub fn is_named(&self, local: &str) -> bool {
        self.local_name() == local
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Child elements with the given local name
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.is_named(local))
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> {
        self.elements_mut().filter(move |el| el.is_named(local))
    }

    /// First child element with the given local name
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|el| el.is_named(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|el| el.is_named(local))
    }

    /// Unescaped, trimmed text content (text and CDATA children)
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => match unescape(raw) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => out.push_str(raw),
                },
                Node::CData(raw) => out.push_str(raw),
                _ => {}
            }
        }
        out.trim().to_string()
    }

    /// Text of the named child, if present
    #[must_use]
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local).map(Element::text)
    }

    /// Replace all content with a single escaped text node
    pub fn set_text(&mut self, value: &str) {
        self.children = vec![Node::Text(escape(value).into_owned())];
        self.self_closing = false;
    }

    /// True if any child is an element
    #[must_use]
    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Append `child` laid out for an element at `depth`
    ///
    /// With a layout the child goes on its own line at `depth + 1` and is
    /// itself indented; without one it is appended as-is. Returns the
    /// index of the inserted node.
    pub fn append_child(
        &mut self,
        mut child: Element,
        depth: usize,
        layout: Option<Layout<'_>>,
    ) -> usize {
        self.self_closing = false;
        let Some(layout) = layout else {
            self.children.push(Node::Element(child));
            return self.children.len() - 1;
        };

        child.indent(depth + 1, layout);
        let child_ws = Node::Text(layout.line(depth + 1));

        let only_whitespace = self.children.iter().all(Node::is_whitespace);
        if self.children.last().is_some_and(Node::is_whitespace) {
            let at = self.children.len() - 1;
            if only_whitespace {
                self.children[at] = Node::Text(layout.line(depth));
            }
            self.children.insert(at, child_ws);
            self.children.insert(at + 1, Node::Element(child));
            at + 1
        } else if self.children.is_empty() {
            self.children.push(child_ws);
            self.children.push(Node::Element(child));
            self.children.push(Node::Text(layout.line(depth)));
            1
        } else {
            self.children.push(Node::Element(child));
            self.children.len() - 1
        }
    }

    /// First child named `local`, appending an empty one when missing
    pub fn child_or_insert(
        &mut self,
        local: &str,
        depth: usize,
        layout: Option<Layout<'_>>,
    ) -> Option<&mut Element> {
        let index = match self
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|el| el.is_named(local)))
        {
            Some(index) => index,
            None => self.append_child(Element::new(local), depth, layout),
        };
        self.children.get_mut(index).and_then(Node::as_element_mut)
    }

    /// Remove child elements matching `predicate`
    ///
    /// Whitespace directly before a removed element goes with it. Returns
    /// the number of elements removed.
    pub fn remove_elements_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let mut kept: Vec<Node> = Vec::with_capacity(self.children.len());
        let mut removed = 0;
        for node in self.children.drain(..) {
            if let Node::Element(el) = &node {
                if predicate(el) {
                    if kept.last().is_some_and(Node::is_whitespace) {
                        kept.pop();
                    }
                    removed += 1;
                    continue;
                }
            }
            kept.push(node);
        }
        self.children = kept;
        removed
    }

    /// Lay out element-only content one element per line
    ///
    /// Elements holding text (or mixed content) are left untouched.
    pub fn indent(&mut self, depth: usize, layout: Layout<'_>) {
        let element_only = self.has_element_children()
            && self
                .children
                .iter()
                .all(|n| matches!(n, Node::Element(_)) || n.is_whitespace());
        if !element_only {
            return;
        }

        let mut laid_out = Vec::with_capacity(self.children.len() * 2 + 1);
        for node in self.children.drain(..) {
            if let Node::Element(mut el) = node {
                el.indent(depth + 1, layout);
                laid_out.push(Node::Text(layout.line(depth + 1)));
                laid_out.push(Node::Element(el));
            }
        }
        laid_out.push(Node::Text(layout.line(depth)));
        self.children = laid_out;
    }

    fn start_tag(&self) -> BytesStart<'_> {
        BytesStart::from_content(format!("{}{}", self.name, self.attributes), self.name.len())
    }
}

/// Indentation unit and line terminator for inserted elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout<'a> {
    pub unit: &'a str,
    /// `"\n"` or `"\r\n"`
    pub newline: &'a str,
}

impl<'a> Layout<'a> {
    /// Layout with `\n` line endings
    #[must_use]
    pub const fn new(unit: &'a str) -> Self {
        Self {
            unit,
            newline: "\n",
        }
    }

    #[must_use]
    pub const fn with_newline(mut self, newline: &'a str) -> Self {
        self.newline = newline;
        self
    }

    fn line(self, depth: usize) -> String {
        format!("{}{}", self.newline, self.unit.repeat(depth))
    }
}

/// Parsed document pieces: prolog, root element, trailing nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlTree {
    /// Source started with a byte-order mark
    pub(crate) bom: bool,
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    pub(crate) epilog: Vec<Node>,
}

/// Parse text into a lossless tree
pub(crate) fn parse_tree(text: &str) -> Result<XmlTree, ParseError> {
    let (bom, text) = match text.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| ParseError::syntax_error(position, e.to_string()))?;

        let node = match event {
            Event::Start(start) => {
                stack.push(element_from_start(&reader, &start, false)?);
                continue;
            }
            Event::Empty(start) => Node::Element(element_from_start(&reader, &start, true)?),
            Event::End(end) => {
                let closed = stack.pop().ok_or_else(|| {
                    ParseError::syntax_error(position, "closing tag without matching start")
                })?;
                let end_name = decode(&reader, end.name().as_ref())?;
                if end_name != closed.name {
                    return Err(ParseError::syntax_error(
                        position,
                        format!("expected </{}>, found </{}>", closed.name, end_name),
                    ));
                }
                Node::Element(closed)
            }
            Event::Text(text) => Node::Text(decode(&reader, &text)?),
            Event::CData(data) => Node::CData(decode(&reader, &data)?),
            Event::Comment(comment) => Node::Comment(decode(&reader, &comment)?),
            Event::PI(pi) => Node::ProcessingInstruction(decode(&reader, &pi)?),
            Event::Decl(decl) => Node::Declaration(decode(&reader, &decl)?),
            Event::DocType(doctype) => Node::DocType(decode(&reader, &doctype)?),
            Event::Eof => break,
        };

        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
            continue;
        }

        match node {
            Node::Element(el) => {
                if root.is_some() {
                    return Err(ParseError::Structure(format!(
                        "second root element <{}>",
                        el.name
                    )));
                }
                root = Some(el);
            }
            Node::Text(ref t) if !t.chars().all(char::is_whitespace) => {
                return Err(ParseError::Structure(
                    "text outside the root element".to_string(),
                ));
            }
            other if root.is_none() => prolog.push(other),
            other => epilog.push(other),
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::syntax_error(
            reader.buffer_position() as u64,
            format!("unclosed element <{}>", open.name),
        ));
    }

    let root = root.ok_or_else(|| ParseError::Structure("no root element".to_string()))?;
    Ok(XmlTree {
        bom,
        prolog,
        root,
        epilog,
    })
}

fn decode(reader: &Reader<&[u8]>, bytes: &[u8]) -> Result<String, ParseError> {
    reader
        .decoder()
        .decode(bytes)
        .map(Cow::into_owned)
        .map_err(|e| ParseError::Encoding(e.to_string()))
}

fn element_from_start(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    self_closing: bool,
) -> Result<Element, ParseError> {
    let content = decode(reader, start)?;
    let name = decode(reader, start.name().as_ref())?;
    let attributes = content[name.len()..].to_string();
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        self_closing,
    })
}

/// Serialize a tree back to text
pub(crate) fn write_tree(tree: &XmlTree) -> Result<String, SerializeError> {
    let mut out = Vec::new();
    if tree.bom {
        let mut buf = [0; 4];
        out.extend_from_slice(BOM.encode_utf8(&mut buf).as_bytes());
    }
    let mut writer = Writer::new(out);
    for node in &tree.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &tree.root)?;
    for node in &tree.epilog {
        write_node(&mut writer, node)?;
    }
    String::from_utf8(writer.into_inner()).map_err(|_| SerializeError::InvalidUtf8)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), SerializeError> {
    let event = match node {
        Node::Element(el) => return write_element(writer, el),
        Node::Text(raw) => Event::Text(BytesText::from_escaped(raw.as_str())),
        Node::CData(raw) => Event::CData(BytesCData::new(raw.as_str())),
        Node::Comment(raw) => Event::Comment(BytesText::from_escaped(raw.as_str())),
        Node::ProcessingInstruction(raw) => Event::PI(BytesPI::new(raw.as_str())),
        Node::Declaration(raw) => {
            Event::Decl(BytesDecl::from_start(BytesStart::from_content(raw.as_str(), 3)))
        }
        Node::DocType(raw) => Event::DocType(BytesText::from_escaped(raw.as_str())),
    };
    emit(writer, event)
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), SerializeError> {
    if el.self_closing && el.children.is_empty() {
        return emit(writer, Event::Empty(el.start_tag()));
    }
    emit(writer, Event::Start(el.start_tag()))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(el.name.as_str())))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SerializeError> {
    writer
        .write_event(event)
        .map_err(|e| SerializeError::SerializationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roundtrip(text: &str) -> String {
        write_tree(&parse_tree(text).unwrap()).unwrap()
    }

    #[test]
    fn roundtrip_preserves_layout() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
            <!-- header -->\n\
            <project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n         \
            xmlns:xsi='http://www.w3.org/2001/XMLSchema-instance'>\n  \
            <name>a &amp; b</name>\n  <empty />\n  <![CDATA[<raw>]]>\n\
            </project>\n";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn byte_order_mark_is_kept() {
        let text = "\u{feff}<?xml version=\"1.0\"?>\n<project>\n  <a/>\n</project>\n";
        let tree = parse_tree(text).unwrap();
        assert!(tree.bom);
        assert_eq!(write_tree(&tree).unwrap(), text);
        assert_eq!(roundtrip("<project/>"), "<project/>");
    }

    #[test]
    fn mismatched_end_tag_is_syntax_error() {
        let err = parse_tree("<project><build></project>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn unclosed_element_is_syntax_error() {
        let err = parse_tree("<project><build>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn missing_root_is_structure_error() {
        let err = parse_tree("<?xml version=\"1.0\"?>\n").unwrap_err();
        assert!(matches!(err, ParseError::Structure(_)));
    }

    #[test]
    fn second_root_is_structure_error() {
        let err = parse_tree("<a/><b/>").unwrap_err();
        assert!(matches!(err, ParseError::Structure(_)));
    }

    #[test]
    fn text_outside_root_is_structure_error() {
        let err = parse_tree("junk<project/>").unwrap_err();
        assert!(matches!(err, ParseError::Structure(_)));
    }

    #[test]
    fn text_is_unescaped_and_trimmed() {
        let tree = parse_tree("<p><v>\n  a &lt; b\n</v></p>").unwrap();
        assert_eq!(tree.root.child_text("v").as_deref(), Some("a < b"));
    }

    #[test]
    fn local_names_ignore_prefix() {
        let tree = parse_tree("<pom:project xmlns:pom=\"x\"><pom:build/></pom:project>").unwrap();
        assert!(tree.root.is_named("project"));
        assert!(tree.root.child("build").is_some());
    }

    #[test]
    fn set_text_escapes() {
        let el = Element::with_text("argLine", "-Dx=<y> & z");
        let tree = XmlTree {
            bom: false,
            prolog: Vec::new(),
            root: el,
            epilog: Vec::new(),
        };
        assert_eq!(
            write_tree(&tree).unwrap(),
            "<argLine>-Dx=&lt;y&gt; &amp; z</argLine>"
        );
    }

    #[test]
    fn append_child_into_pretty_parent() {
        let mut tree = parse_tree("<plugins>\n    <plugin/>\n  </plugins>").unwrap();
        tree.root
            .append_child(
                Element::new("a").with_child(Element::with_text("b", "1")),
                1,
                Some(Layout::new("  ")),
            );
        assert_eq!(
            write_tree(&tree).unwrap(),
            "<plugins>\n    <plugin/>\n    <a>\n      <b>1</b>\n    </a>\n  </plugins>"
        );
    }

    #[test]
    fn append_child_into_empty_parent() {
        let mut tree = parse_tree("<plugins/>").unwrap();
        tree.root
            .append_child(Element::new("plugin"), 2, Some(Layout::new("  ")));
        assert_eq!(
            write_tree(&tree).unwrap(),
            "<plugins>\n      <plugin></plugin>\n    </plugins>"
        );
    }

    #[test]
    fn append_child_uses_layout_newline() {
        let mut tree = parse_tree("<plugins>\r\n    <plugin/>\r\n  </plugins>").unwrap();
        tree.root.append_child(
            Element::new("a").with_child(Element::new("b")),
            1,
            Some(Layout::new("  ").with_newline("\r\n")),
        );
        assert_eq!(
            write_tree(&tree).unwrap(),
            "<plugins>\r\n    <plugin/>\r\n    <a>\r\n      <b></b>\r\n    </a>\r\n  </plugins>"
        );
    }

    #[test]
    fn append_child_without_unit_is_compact() {
        let mut tree = parse_tree("<plugins><plugin/></plugins>").unwrap();
        tree.root.append_child(Element::with_text("x", "1"), 0, None);
        assert_eq!(write_tree(&tree).unwrap(), "<plugins><plugin/><x>1</x></plugins>");
    }

    #[test]
    fn remove_elements_takes_leading_whitespace() {
        let mut tree = parse_tree("<a>\n  <b>1</b>\n  <c/>\n  <b>2</b>\n</a>").unwrap();
        let removed = tree.root.remove_elements_where(|el| el.is_named("b"));
        assert_eq!(removed, 2);
        assert_eq!(write_tree(&tree).unwrap(), "<a>\n  <c/>\n</a>");
    }

    #[test]
    fn child_or_insert_reuses_existing() {
        let mut tree = parse_tree("<a><b>1</b></a>").unwrap();
        let b = tree.root.child_or_insert("b", 0, None).unwrap();
        assert_eq!(b.text(), "1");
        let c = tree.root.child_or_insert("c", 0, None).unwrap();
        c.set_text("2");
        assert_eq!(write_tree(&tree).unwrap(), "<a><b>1</b><c>2</c></a>");
    }
}
