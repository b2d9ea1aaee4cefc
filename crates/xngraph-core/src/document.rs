//! Namespace-aware XML element tree
//!
//! XN files declare everything under a default namespace and nest nodes
//! several levels deep (`Packages/Package/Nodes/Node`), so extraction works
//! on an owned element tree with resolved namespaces rather than on a fixed
//! serde schema.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::path::Path;

use crate::error::XnError;

/// An XML element with its namespace resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Namespace URI the element name is bound to, if any
    pub namespace: Option<String>,
    /// Local name without prefix
    pub name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element with no attributes or children
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Parse a document from an XML string, returning its root element
    pub fn parse(xml: &str) -> Result<Self, XnError> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = namespace_uri(&resolved);
            match event {
                Event::Start(start) => stack.push(Self::from_start(namespace, &start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(namespace, &start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.ok_or(XnError::EmptyDocument)
    }

    /// Parse a document from a file
    pub fn from_file(path: &Path) -> Result<Self, XnError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn from_start(namespace: Option<String>, start: &BytesStart<'_>) -> Result<Self, XnError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            namespace,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
        })
    }

    /// Look up an attribute by its (unprefixed) name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an attribute that must be present
    pub fn required_attribute(&self, key: &'static str) -> Result<&str, XnError> {
        self.attribute(key).ok_or_else(|| XnError::MissingAttribute {
            element: self.name.clone(),
            attribute: key,
        })
    }

    /// Direct children
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// True if this element has the given namespace and local name
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Name in Clark notation, e.g. `{http://www.xmos.com}Network`
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// This element and everything below it, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All matching elements in the subtree rooted here, this one included
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |e| e.is(namespace, name))
    }

    /// Matching direct children only
    pub fn child_elements<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |e| e.is(namespace, name))
    }
}

/// Preorder walk over an element subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

fn namespace_uri(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
