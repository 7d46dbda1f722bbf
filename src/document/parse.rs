//! XML text to [`Document`] conversion on top of `quick-xml`.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::reader::{NsReader, Reader};
use tracing::{debug, trace};

use super::model::{Attribute, Document, Element, ElementId, QName};
use crate::error::{Result, SandError};

/// Parse `xml` into a fully materialized document.
///
/// Any well-formedness problem fails the whole parse; a partial tree is never
/// returned.
pub(crate) fn parse(xml: &str) -> Result<Document> {
    let mut reader = NsReader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        let event = reader.read_event().map_err(|err| {
            malformed(format!("{err} (at byte {})", reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => builder.open(&reader, &start)?,
            Event::Empty(start) => {
                builder.open(&reader, &start)?;
                builder.close()?;
            }
            Event::End(_) => builder.close()?,
            Event::Text(text) => {
                if builder.outside_root() && !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed("text content outside the root element"));
                }
            }
            Event::CData(_) if builder.outside_root() => {
                return Err(malformed("CDATA section outside the root element"));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let document = builder.finish()?;
    debug!(
        elements = document.len(),
        namespaces = document.namespaces().len(),
        "parsed document"
    );
    Ok(document)
}

/// Decode raw document bytes to text.
///
/// A byte order mark wins over the XML declaration; without either the
/// document is UTF-8. Bytes that are invalid in the chosen encoding make the
/// document malformed.
pub(crate) fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => match sniff_utf16(bytes) {
            Some(encoding) => encoding,
            None => declared_encoding(bytes)?.unwrap_or(UTF_8),
        },
    };
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(malformed(format!(
            "content is not valid {}",
            encoding.name()
        )));
    }
    trace!(encoding = encoding.name(), "decoded document");
    Ok(text)
}

/// UTF-16 without a byte order mark, recognized from an opening `<?`.
fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    match bytes {
        [b'<', 0, b'?', 0, ..] => Some(UTF_16LE),
        [0, b'<', 0, b'?', ..] => Some(UTF_16BE),
        _ => None,
    }
}

/// Encoding named by the XML declaration, if the document starts with one.
///
/// A declaration readable as ASCII cannot be UTF-16, so a UTF-16 label there
/// means UTF-8.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>> {
    let mut reader = Reader::from_reader(bytes);
    let Ok(Event::Decl(decl)) = reader.read_event() else {
        return Ok(None);
    };
    match decl.encoding() {
        None => Ok(None),
        Some(Ok(label)) => Encoding::for_label(label.trim_ascii())
            .map(|encoding| {
                if encoding == UTF_16LE || encoding == UTF_16BE {
                    Some(UTF_8)
                } else {
                    Some(encoding)
                }
            })
            .ok_or_else(|| {
                malformed(format!(
                    "unsupported encoding '{}'",
                    String::from_utf8_lossy(&label)
                ))
            }),
        Some(Err(err)) => Err(malformed(format!("XML declaration: {err}"))),
    }
}

fn malformed(message: impl Into<String>) -> SandError {
    SandError::MalformedDocument(message.into())
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|err| malformed(format!("invalid UTF-8 in name: {err}")))
}

#[derive(Default)]
struct TreeBuilder {
    elements: Vec<Element>,
    stack: Vec<ElementId>,
    root_closed: bool,
    namespaces: BTreeMap<String, String>,
    bound_namespaces: BTreeSet<String>,
    unresolved_prefixes: BTreeSet<String>,
}

impl TreeBuilder {
    fn outside_root(&self) -> bool {
        self.stack.is_empty()
    }

    fn resolve(&mut self, resolved: ResolveResult<'_>) -> Result<Option<String>> {
        match resolved {
            ResolveResult::Bound(ns) => utf8(ns.as_ref()).map(Some),
            ResolveResult::Unbound => Ok(None),
            ResolveResult::Unknown(prefix) => {
                let prefix = utf8(&prefix)?;
                trace!(prefix = %prefix, "undeclared namespace prefix");
                self.unresolved_prefixes.insert(prefix);
                Ok(None)
            }
        }
    }

    fn open(&mut self, reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<()> {
        if self.stack.is_empty() && (self.root_closed || !self.elements.is_empty()) {
            return Err(malformed("document has more than one root element"));
        }

        let (resolved, local) = reader.resolve_element(start.name());
        let namespace = self.resolve(resolved)?;
        let name = QName {
            namespace,
            local: utf8(local.as_ref())?,
        };
        let prefix = start
            .name()
            .prefix()
            .map(|p| utf8(p.as_ref()))
            .transpose()?;

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| malformed(format!("attribute error: {err}")))?;
            let value = attr
                .unescape_value()
                .map_err(|err| malformed(format!("attribute value: {err}")))?
                .into_owned();

            if let Some(binding) = attr.key.as_namespace_binding() {
                let declared = match binding {
                    PrefixDeclaration::Default => String::new(),
                    PrefixDeclaration::Named(prefix) => utf8(prefix)?,
                };
                if !value.is_empty() {
                    self.bound_namespaces.insert(value.clone());
                }
                self.namespaces.entry(declared).or_insert(value);
                continue;
            }

            let (resolved, local) = reader.resolve_attribute(attr.key);
            let namespace = self.resolve(resolved)?;
            attributes.push(Attribute {
                name: QName {
                    namespace,
                    local: utf8(local.as_ref())?,
                },
                value,
            });
        }

        let id = ElementId(self.elements.len());
        let parent = self.stack.last().copied();
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(id);
        }
        self.elements.push(Element {
            id,
            name,
            prefix,
            attributes,
            children: Vec::new(),
            parent,
        });
        self.stack.push(id);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.stack.pop().is_none() {
            return Err(malformed("closing tag without a matching start tag"));
        }
        if self.stack.is_empty() {
            self.root_closed = true;
        }
        Ok(())
    }

    fn finish(self) -> Result<Document> {
        if let Some(open) = self.stack.last() {
            let name = self.elements[open.0].display_name();
            return Err(malformed(format!("unclosed element <{name}> at end of input")));
        }
        if self.elements.is_empty() {
            return Err(malformed("document has no root element"));
        }

        let mut document = Document {
            elements: self.elements,
            namespaces: self.namespaces,
            bound_namespaces: self.bound_namespaces,
            unresolved_prefixes: self.unresolved_prefixes,
            id_index: HashMap::new(),
        };
        document.build_index();
        Ok(document)
    }
}
