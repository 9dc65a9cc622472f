/*!
 * Document serializer.
 *
 * Output always starts with a UTF-8 XML declaration. Element-only content is
 * re-indented; mixed content and anything inside the configured verbatim
 * elements is written exactly as held in the tree, so translated text keeps
 * its spacing. Events go through `quick_xml::Writer` without its automatic
 * indentation, which would break mixed content; indentation is written as
 * whitespace text events instead.
 */

use quick_xml::Writer;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use super::dom::{Document, Element, Misc, Node};
use crate::errors::XliffError;

/// Serializer settings
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Re-indent element-only content
    pub pretty: bool,
    /// Indentation unit
    pub indent: String,
    /// Local names whose content is never re-indented
    pub verbatim_elements: Vec<String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            verbatim_elements: ["source", "target", "seg-source", "note"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

/// Serializes documents to UTF-8 bytes
#[derive(Debug, Clone, Default)]
pub struct DocumentWriter {
    config: WriterConfig,
}

impl DocumentWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Serialize a whole document
    pub fn to_bytes(&self, doc: &Document) -> Result<Vec<u8>, XliffError> {
        let mut writer = Writer::new(Vec::new());
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_event(&mut writer, newline())?;
        for misc in &doc.prolog {
            write_misc(&mut writer, misc)?;
            write_event(&mut writer, newline())?;
        }
        self.write_element(&mut writer, &doc.root, 0, false)?;
        write_event(&mut writer, newline())?;
        for misc in &doc.epilog {
            write_misc(&mut writer, misc)?;
            write_event(&mut writer, newline())?;
        }
        Ok(writer.into_inner())
    }

    pub fn to_string(&self, doc: &Document) -> Result<String, XliffError> {
        into_string(self.to_bytes(doc)?)
    }

    /// Serialize one element without its tail, content verbatim
    pub fn element_to_string(&self, element: &Element) -> Result<String, XliffError> {
        let mut writer = Writer::new(Vec::new());
        self.write_element(&mut writer, element, 0, true)?;
        into_string(writer.into_inner())
    }

    fn is_verbatim(&self, element: &Element) -> bool {
        element.preserves_space()
            || self
                .config
                .verbatim_elements
                .iter()
                .any(|name| element.is(name))
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        element: &Element,
        depth: usize,
        verbatim: bool,
    ) -> Result<(), XliffError> {
        let mut start = BytesStart::new(element.name.as_str());
        for attr in &element.attributes {
            let value = escape_attribute(&attr.value);
            start.push_attribute((attr.name.as_bytes(), value.as_bytes()));
        }

        if element.text.is_empty() && element.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }
        write_event(writer, Event::Start(start))?;

        let verbatim = verbatim || self.is_verbatim(element);
        let reindent = self.config.pretty
            && !verbatim
            && !element.children.is_empty()
            && element.text.trim().is_empty()
            && element.children.iter().all(|node| node.tail().trim().is_empty());

        if reindent {
            for node in &element.children {
                write_event(writer, self.indentation(depth + 1))?;
                self.write_node(writer, node, depth + 1, false)?;
            }
            write_event(writer, self.indentation(depth))?;
        } else {
            // Mixed content: descendants keep their exact layout
            let nested_verbatim = verbatim || !element.children.is_empty();
            write_text(writer, &element.text)?;
            for node in &element.children {
                self.write_node(writer, node, depth + 1, nested_verbatim)?;
                write_text(writer, node.tail())?;
            }
        }

        write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Vec<u8>>,
        node: &Node,
        depth: usize,
        verbatim: bool,
    ) -> Result<(), XliffError> {
        match node {
            Node::Element(element) => self.write_element(writer, element, depth, verbatim),
            Node::Comment { content, .. } => {
                write_event(writer, Event::Comment(BytesText::from_escaped(content.as_str())))
            }
            Node::Instruction { content, .. } => {
                write_event(writer, Event::PI(BytesPI::new(content.as_str())))
            }
        }
    }

    /// Newline followed by the indentation for a depth
    fn indentation(&self, depth: usize) -> Event<'static> {
        let mut whitespace = String::from("\n");
        for _ in 0..depth {
            whitespace.push_str(&self.config.indent);
        }
        Event::Text(BytesText::from_escaped(whitespace))
    }
}

fn newline() -> Event<'static> {
    Event::Text(BytesText::from_escaped("\n"))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XliffError> {
    writer
        .write_event(event)
        .map_err(|e| XliffError::Write(e.to_string()))
}

/// Character data; quotes stay literal outside attributes
fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), XliffError> {
    if text.is_empty() {
        return Ok(());
    }
    write_event(writer, Event::Text(BytesText::from_escaped(partial_escape(text))))
}

fn write_misc(writer: &mut Writer<Vec<u8>>, misc: &Misc) -> Result<(), XliffError> {
    let event = match misc {
        Misc::Comment(content) => Event::Comment(BytesText::from_escaped(content.as_str())),
        Misc::Instruction(content) => Event::PI(BytesPI::new(content.as_str())),
        Misc::DocType(content) => Event::DocType(BytesText::from_escaped(content.as_str())),
    };
    write_event(writer, event)
}

fn into_string(bytes: Vec<u8>) -> Result<String, XliffError> {
    String::from_utf8(bytes).map_err(|e| XliffError::Encoding(e.to_string()))
}

/// Escape an attribute value, keeping whitespace characters that would
/// otherwise be normalized away by a reader
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
