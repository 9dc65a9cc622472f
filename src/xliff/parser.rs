/*!
 * XML reader building the document tree.
 *
 * Events from `quick_xml::Reader` are folded into `Element`s with the
 * text/tail model. Whitespace is kept exactly (no trimming) so untouched
 * parts of the document serialize back unchanged. Namespaces are resolved
 * with a scope stack fed by `xmlns` declarations on each start tag.
 */

use log::trace;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::dom::{Attribute, Document, Element, Misc, Node, XML_NAMESPACE};
use crate::errors::XliffError;

const BOM: char = '\u{FEFF}';

/// Parse raw bytes into a document; a UTF-8 byte order mark is accepted
pub fn parse_document(input: &[u8]) -> Result<Document, XliffError> {
    let text = std::str::from_utf8(input).map_err(|e| XliffError::Encoding(e.to_string()))?;
    parse_str(text)
}

/// Parse a string into a document
pub fn parse_str(input: &str) -> Result<Document, XliffError> {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    TreeBuilder::default().build(input)
}

/// Decode a run of XML character data (entity references included).
///
/// Fails when the run is not pure text: stray `<` or `&`, tags, comments or
/// unknown entities all make it invalid.
pub fn decode_text_run(run: &str) -> Result<String, XliffError> {
    let wrapped = format!("<run>{}</run>", run);
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    let mut depth = 0usize;
    let mut out = String::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error(reader.error_position(), e))?;
        match event {
            Event::Start(_) if depth == 0 => depth += 1,
            Event::End(_) if depth == 1 => depth -= 1,
            Event::Text(text) if depth == 1 => {
                let decoded = text
                    .unescape()
                    .map_err(|e| parse_error(reader.buffer_position(), e))?;
                out.push_str(&decoded);
            }
            Event::CData(data) if depth == 1 => out.push_str(&String::from_utf8_lossy(&data)),
            Event::Eof if depth == 0 => break,
            other => {
                return Err(XliffError::Parse {
                    position: reader.buffer_position(),
                    message: format!("unexpected markup in text run: {:?}", other),
                });
            }
        }
    }
    Ok(out)
}

fn parse_error(position: u64, error: impl std::fmt::Display) -> XliffError {
    XliffError::Parse {
        position,
        message: error.to_string(),
    }
}

/// Namespace bindings introduced by one element
type Scope = Vec<(String, String)>;

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    scopes: Vec<Scope>,
    prolog: Vec<Misc>,
    epilog: Vec<Misc>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn build(mut self, input: &str) -> Result<Document, XliffError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);

        loop {
            let event = reader
                .read_event()
                .map_err(|e| parse_error(reader.error_position(), e))?;
            let position = reader.buffer_position();
            match event {
                Event::Start(start) => {
                    let element = self.open(&start, position)?;
                    self.stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.open(&start, position)?;
                    self.close(element, position)?;
                }
                Event::End(_) => {
                    let element = self.stack.pop().ok_or_else(|| XliffError::Parse {
                        position,
                        message: "unmatched end tag".to_string(),
                    })?;
                    self.close(element, position)?;
                }
                Event::Text(text) => {
                    let decoded = text.unescape().map_err(|e| parse_error(position, e))?;
                    self.push_text(&decoded, position)?;
                }
                Event::CData(data) => {
                    let content = String::from_utf8_lossy(&data).into_owned();
                    self.push_text(&content, position)?;
                }
                Event::Comment(comment) => {
                    let content = String::from_utf8_lossy(&comment).into_owned();
                    self.push_misc(Misc::Comment(content));
                }
                Event::PI(instruction) => {
                    let content = String::from_utf8_lossy(&instruction).into_owned();
                    self.push_misc(Misc::Instruction(content));
                }
                Event::DocType(doctype) => {
                    let content = String::from_utf8_lossy(&doctype).trim().to_string();
                    self.prolog.push(Misc::DocType(content));
                }
                // The declaration is regenerated on output
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if !self.stack.is_empty() {
            return Err(XliffError::Parse {
                position: reader.buffer_position(),
                message: format!("{} unclosed element(s) at end of input", self.stack.len()),
            });
        }
        let root = self.root.ok_or(XliffError::MissingRoot)?;
        trace!("Parsed document root <{}>", root.name);
        Ok(Document::new(self.prolog, root, self.epilog))
    }

    fn open(&mut self, start: &BytesStart<'_>, position: u64) -> Result<Element, XliffError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(XliffError::Parse {
                position,
                message: "content after the root element".to_string(),
            });
        }

        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        let mut scope = Scope::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| parse_error(position, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| parse_error(position, e))?
                .into_owned();
            if key == "xmlns" {
                scope.push((String::new(), value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.push((prefix.to_string(), value.clone()));
            }
            attributes.push(Attribute { name: key, value });
        }
        self.scopes.push(scope);

        let prefix = name.split_once(':').map(|(prefix, _)| prefix).unwrap_or("");
        let namespace = self.resolve(prefix);
        Ok(Element {
            name,
            namespace,
            attributes,
            ..Default::default()
        })
    }

    fn close(&mut self, element: Element, position: u64) -> Result<(), XliffError> {
        self.scopes.pop();
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => {
                if self.root.is_some() {
                    return Err(XliffError::Parse {
                        position,
                        message: "multiple root elements".to_string(),
                    });
                }
                self.root = Some(element);
            }
        }
        Ok(())
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }

    fn push_text(&mut self, text: &str, position: u64) -> Result<(), XliffError> {
        match self.stack.last_mut() {
            Some(parent) => {
                match parent.children.last_mut() {
                    Some(last) => last.tail_mut().push_str(text),
                    None => parent.text.push_str(text),
                }
                Ok(())
            }
            // Whitespace between prolog items and the root is not kept
            None if text.trim().is_empty() => Ok(()),
            None => Err(XliffError::Parse {
                position,
                message: "text outside the root element".to_string(),
            }),
        }
    }

    fn push_misc(&mut self, misc: Misc) {
        match self.stack.last_mut() {
            Some(parent) => {
                let node = match misc {
                    Misc::Comment(content) => Node::Comment {
                        content,
                        tail: String::new(),
                    },
                    Misc::Instruction(content) | Misc::DocType(content) => Node::Instruction {
                        content,
                        tail: String::new(),
                    },
                };
                parent.children.push(node);
            }
            None if self.root.is_none() => self.prolog.push(misc),
            None => self.epilog.push(misc),
        }
    }
}
