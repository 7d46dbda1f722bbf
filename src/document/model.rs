//! Immutable element tree produced by the parser.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::namespaces::XML_NS;
use crate::error::{Result, SandError};

/// A namespace-qualified name.
///
/// Equality ignores the source prefix: `sand:Channel` and `s:Channel` are the
/// same name when both prefixes resolve to the same URI.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// A name in no namespace (unprefixed attributes, for instance).
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Index of an element inside its [`Document`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) name: QName,
    pub(crate) prefix: Option<String>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) parent: Option<ElementId>,
}

impl Element {
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &QName {
        &self.name
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Name as written in the source, e.g. `sand:Channel`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name.local),
            None => self.name.local.clone(),
        }
    }

    /// Value of an unprefixed attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == name)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespace-qualified attribute.
    #[must_use]
    pub fn attribute_ns(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub const fn parent_id(&self) -> Option<ElementId> {
        self.parent
    }
}

/// A parsed XML document.
///
/// Elements live in an arena in pre-order (root first, children in document
/// order), so iterating the arena is a document-order traversal.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) elements: Vec<Element>,
    pub(crate) namespaces: BTreeMap<String, String>,
    pub(crate) bound_namespaces: BTreeSet<String>,
    pub(crate) unresolved_prefixes: BTreeSet<String>,
    pub(crate) id_index: HashMap<QName, HashMap<String, Vec<ElementId>>>,
}

impl Document {
    /// Parse a document from XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        super::parse::parse(xml)
    }

    /// Read and parse a document from disk, decoding it by its byte order
    /// mark or XML declaration.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        super::parse::decode(&raw)
            .and_then(|text| Self::parse(&text))
            .map_err(|err| match err {
                SandError::MalformedDocument(msg) => {
                    SandError::MalformedDocument(format!("{}: {msg}", path.display()))
                }
                other => other,
            })
    }

    pub(crate) fn build_index(&mut self) {
        let mut index: HashMap<QName, HashMap<String, Vec<ElementId>>> = HashMap::new();
        for element in &self.elements {
            if let Some(id) = element.attribute("id") {
                index
                    .entry(element.name.clone())
                    .or_default()
                    .entry(id.to_string())
                    .or_default()
                    .push(element.id);
            }
        }
        self.id_index = index;
    }

    #[must_use]
    pub fn root(&self) -> &Element {
        &self.elements[0]
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// All elements in pre-order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Children of `element`, optionally restricted to one name.
    pub fn children<'a>(
        &'a self,
        element: &'a Element,
        name: Option<&'a QName>,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        element
            .children
            .iter()
            .map(move |id| self.element(*id))
            .filter(move |child| name.is_none_or(|n| &child.name == n))
    }

    #[must_use]
    pub fn parent(&self, element: &Element) -> Option<&Element> {
        element.parent.map(|id| self.element(id))
    }

    /// Shorthand for [`Element::attribute`].
    #[must_use]
    pub fn attribute<'a>(&self, element: &'a Element, name: &str) -> Option<&'a str> {
        element.attribute(name)
    }

    #[must_use]
    pub fn attribute_exists(&self, element: &Element, name: &str) -> bool {
        element.has_attribute(name)
    }

    /// Resolve `prefix:local` with the document's namespace bindings.
    ///
    /// An empty prefix resolves to the default namespace, or to no namespace
    /// when none is declared.
    pub fn resolve_qname(&self, prefix: &str, local: &str) -> Result<QName> {
        if prefix == "xml" {
            return Ok(QName::new(XML_NS, local));
        }
        match self.namespaces.get(prefix) {
            Some(uri) if uri.is_empty() => Ok(QName::unqualified(local)),
            Some(uri) => Ok(QName::new(uri.clone(), local)),
            None if prefix.is_empty() => Ok(QName::unqualified(local)),
            None => Err(SandError::UnknownNamespace(format!(
                "prefix '{prefix}' is not bound in the document"
            ))),
        }
    }

    /// First prefix bound to `namespace`; `""` stands for the default namespace.
    #[must_use]
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(_, uri)| uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Whether any `xmlns` declaration in the document binds `namespace`,
    /// including declarations shadowed by an earlier binding of the same prefix.
    #[must_use]
    pub fn binds_namespace(&self, namespace: &str) -> bool {
        self.bound_namespaces.contains(namespace)
    }

    #[must_use]
    pub const fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    /// Prefixes used on elements or attributes without any declaration.
    #[must_use]
    pub const fn unresolved_prefixes(&self) -> &BTreeSet<String> {
        &self.unresolved_prefixes
    }

    /// Elements named `name` whose `id` attribute equals `id`, anywhere in the document.
    #[must_use]
    pub fn find_by_id(&self, name: &QName, id: &str) -> &[ElementId] {
        self.id_index
            .get(name)
            .and_then(|ids| ids.get(id))
            .map_or(&[], Vec::as_slice)
    }

    /// Location of `element` from the root, e.g. `/MPD[1]/Period[1]/AdaptationSet[2]`.
    #[must_use]
    pub fn path(&self, element: &Element) -> String {
        let mut segments = Vec::new();
        let mut current = Some(element);
        while let Some(el) = current {
            let position = self.parent(el).map_or(1, |parent| {
                parent
                    .children
                    .iter()
                    .map(|id| self.element(*id))
                    .take_while(|sibling| sibling.id != el.id)
                    .filter(|sibling| sibling.name == el.name)
                    .count()
                    + 1
            });
            segments.push(format!("{}[{position}]", el.display_name()));
            current = self.parent(el);
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }
}
