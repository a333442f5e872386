//! Generic XML tree used for SOAP envelopes and the XML-string payloads
//! the registry nests inside them.
//!
//! The registry's record schema is not modeled. A [`ResultNode`] only knows
//! element names, attributes, text and children.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while decoding an XML document into a [`ResultNode`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("document is empty")]
    Empty,

    #[error("XML syntax error: {0}")]
    Syntax(String),

    #[error("unbalanced element tags")]
    Unbalanced,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text found outside the root element")]
    TextOutsideRoot,
}

/// A decoded XML element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNode {
    name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ResultNode>,
}

impl ResultNode {
    /// Create an empty element with the given qualified name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Qualified name as written in the document (`s:Envelope`, `dane`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Concatenated character data directly inside this element
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| name_matches(key, name))
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[ResultNode] {
        &self.children
    }

    /// First child element with the given name
    ///
    /// A name without a prefix matches on local name, so `child("Body")`
    /// finds `s:Body` as well as `Body`. A prefixed name must match exactly.
    pub fn child(&self, name: &str) -> Option<&ResultNode> {
        self.children.iter().find(|c| c.is_named(name))
    }

    /// All child elements with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResultNode> + 'a {
        self.children.iter().filter(move |c| c.is_named(name))
    }

    /// Consume this node and keep only the children with the given name
    pub fn into_children_named(self, name: &str) -> Vec<ResultNode> {
        self.children
            .into_iter()
            .filter(|c| c.is_named(name))
            .collect()
    }

    /// Walk down a chain of child names
    ///
    /// # Example
    /// ```
    /// use gus_bir_client::ResultNode;
    ///
    /// let root = ResultNode::parse("<a><b><c>1</c></b></a>").unwrap();
    /// assert_eq!(root.path(&["b", "c"]).map(|n| n.text()), Some("1"));
    /// ```
    pub fn path(&self, names: &[&str]) -> Option<&ResultNode> {
        names
            .iter()
            .try_fold(self, |node, name| node.child(name))
    }

    /// Does this element carry the given name (see [`ResultNode::child`])
    pub fn is_named(&self, name: &str) -> bool {
        name_matches(&self.name, name)
    }

    /// Parse a complete XML document into its root element
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        parse(input)
    }
}

fn name_matches(qualified: &str, wanted: &str) -> bool {
    if wanted.contains(':') {
        qualified == wanted
    } else {
        qualified.rsplit(':').next() == Some(wanted)
    }
}

/// Parse a complete XML document into its root element
///
/// Rejects empty input, unbalanced tags, more than one root and
/// non-whitespace text outside the root. Declarations, comments and
/// processing instructions are skipped. Text of leaf elements keeps its
/// surrounding whitespace.
pub fn parse(input: &str) -> Result<ResultNode, XmlError> {
    if input.trim().is_empty() {
        return Err(XmlError::Empty);
    }

    let mut reader = Reader::from_str(input);

    let mut stack: Vec<ResultNode> = Vec::new();
    let mut root: Option<ResultNode> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(XmlError::Syntax(e.to_string())),
        };

        match event {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::MultipleRoots);
                }
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let node = element_from_start(&start)?;
                close_element(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack.pop().ok_or(XmlError::Unbalanced)?;
                close_element(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| XmlError::Syntax(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Unbalanced);
    }

    root.ok_or(XmlError::Empty)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<ResultNode, XmlError> {
    let mut node = ResultNode::new(String::from_utf8_lossy(start.name().as_ref()));

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Syntax(e.to_string()))?
            .into_owned();
        node.attributes.insert(key, value);
    }

    Ok(node)
}

fn close_element(
    stack: &mut [ResultNode],
    root: &mut Option<ResultNode>,
    mut node: ResultNode,
) -> Result<(), XmlError> {
    // Indentation between child elements is not content; leaf text is kept as-is
    if !node.children.is_empty() && node.text.trim().is_empty() {
        node.text.clear();
    }

    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_some() => Err(XmlError::MultipleRoots),
        None => {
            *root = Some(node);
            Ok(())
        }
    }
}

fn push_text(stack: &mut [ResultNode], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::TextOutsideRoot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <root version="2">
                <dane><Regon>000331501</Regon><Nazwa>GŁÓWNY URZĄD STATYSTYCZNY</Nazwa></dane>
            </root>"#,
        )
        .unwrap();

        assert_eq!(root.name(), "root");
        assert_eq!(root.attr("version"), Some("2"));
        assert_eq!(root.path(&["dane", "Regon"]).unwrap().text(), "000331501");
        assert_eq!(
            root.path(&["dane", "Nazwa"]).unwrap().text(),
            "GŁÓWNY URZĄD STATYSTYCZNY"
        );
    }

    #[test]
    fn unescapes_entities_and_cdata() {
        let root = parse("<a><b>Kowalski &amp; S-ka</b><c><![CDATA[<x/>]]></c></a>").unwrap();
        assert_eq!(root.child("b").unwrap().text(), "Kowalski & S-ka");
        assert_eq!(root.child("c").unwrap().text(), "<x/>");
    }

    #[test]
    fn unprefixed_lookup_matches_local_name() {
        let root = parse(
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body/></s:Envelope>"#,
        )
        .unwrap();

        assert_eq!(root.local_name(), "Envelope");
        assert!(root.child("Body").is_some());
        assert!(root.child("s:Body").is_some());
        assert!(root.child("x:Body").is_none());
    }

    #[test]
    fn keeps_whitespace_of_leaf_text() {
        let root = parse("<root>\n  <Nazwa> A &amp; B </Nazwa>\n  <Puste>   </Puste>\n</root>").unwrap();
        assert_eq!(root.text(), "");
        assert_eq!(root.child("Nazwa").unwrap().text(), " A & B ");
        assert_eq!(root.child("Puste").unwrap().text(), "   ");
    }

    #[test]
    fn collects_repeated_children() {
        let root = parse("<root><dane>1</dane><dane>2</dane><inne/></root>").unwrap();
        let texts: Vec<_> = root.children_named("dane").map(|n| n.text()).collect();
        assert_eq!(texts, ["1", "2"]);
        assert_eq!(root.into_children_named("dane").len(), 2);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse(""), Err(XmlError::Empty));
        assert_eq!(parse("  \n "), Err(XmlError::Empty));
        assert_eq!(parse("<?xml version=\"1.0\"?>"), Err(XmlError::Empty));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            parse("<root><dane>"),
            Err(XmlError::Unbalanced | XmlError::Syntax(_))
        ));
        assert!(matches!(parse("<a></b>"), Err(XmlError::Syntax(_))));
        assert_eq!(parse("<a/><b/>"), Err(XmlError::MultipleRoots));
        assert_eq!(parse("<a></a><b></b>"), Err(XmlError::MultipleRoots));
        assert_eq!(parse("plain text"), Err(XmlError::TextOutsideRoot));
    }

    #[test]
    fn serializes_to_compact_json() {
        let root = parse("<dane><Nip>5261040828</Nip></dane>").unwrap();
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "dane",
                "children": [{ "name": "Nip", "text": "5261040828" }]
            })
        );
    }
}
