use std::{collections::HashMap, sync::LazyLock};

use quick_xml::{
    Reader,
    escape::{resolve_predefined_entity, unescape_with},
    events::{BytesStart, Event, attributes::Attribute},
};
use regex::{Captures, Regex};
use thiserror::Error;

/// Elements that carry no geometry and are dropped along with their subtree.
const NON_RENDERING: &[&str] = &["style"];

static ENTITY_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%"'>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
        .expect("entity declaration pattern is valid")
});
static ENTITY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[^&;\s]+;").expect("entity reference pattern is valid"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed markup near byte {position}")]
    Malformed {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error("no <svg> element found")]
    MissingRoot,
}

/// Turns markup text into a [`ParsedElement`] tree rooted at the first `svg`
/// element.
pub trait MarkupParser {
    fn parse(&self, text: &str) -> Result<ParsedElement, ParseError>;
}

/// Attribute list in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, key: String, value: String) {
        self.0.push((key, value));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedElement {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<ParsedElement>,
}

impl ParsedElement {
    fn from_start(start: &BytesStart, entities: &Entities) -> Result<Self, quick_xml::Error> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Attributes::default();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            attributes.push(key, entities.decode(&attr)?);
        }
        Ok(Self {
            tag,
            attributes,
            children: vec![],
        })
    }

    fn into_svg(self) -> Option<Self> {
        if self.tag == "svg" {
            Some(self)
        } else {
            self.children.into_iter().find_map(Self::into_svg)
        }
    }
}

/// General entities declared in the document's internal DTD subset.
#[derive(Debug, Default)]
struct Entities(HashMap<String, String>);

impl Entities {
    fn declare(&mut self, doctype: &str) {
        for decl in ENTITY_DECL.captures_iter(doctype) {
            let value = decl.get(2).or_else(|| decl.get(3)).map_or("", |m| m.as_str());
            // The first declaration of an entity is binding.
            self.0
                .entry(decl[1].to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .or_else(|| resolve_predefined_entity(name))
    }

    /// Decodes an attribute value. References to undeclared entities are kept
    /// as written.
    fn decode(&self, attr: &Attribute) -> Result<String, quick_xml::Error> {
        match attr.unescape_value_with(|name| self.resolve(name)) {
            Ok(value) => Ok(value.into_owned()),
            Err(quick_xml::Error::Escape(_)) => {
                let raw = String::from_utf8_lossy(&attr.value);
                let value = ENTITY_REF.replace_all(&raw, |reference: &Captures| {
                    unescape_with(&reference[0], |name| self.resolve(name))
                        .map_or_else(|_| reference[0].to_string(), |value| value.into_owned())
                });
                Ok(value.into_owned())
            }
            Err(err) => Err(err),
        }
    }
}

/// [`MarkupParser`] backed by quick-xml.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlParser;

impl MarkupParser for XmlParser {
    fn parse(&self, text: &str) -> Result<ParsedElement, ParseError> {
        let mut reader = Reader::from_str(text);
        let mut open: Vec<ParsedElement> = vec![];
        let mut roots = vec![];
        let mut entities = Entities::default();

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(source) => {
                    return Err(ParseError::Malformed {
                        position: reader.buffer_position() as u64,
                        source,
                    });
                }
            };
            let malformed = |source: quick_xml::Error| ParseError::Malformed {
                position: reader.buffer_position() as u64,
                source,
            };
            match event {
                Event::DocType(doctype) => entities.declare(&String::from_utf8_lossy(&doctype)),
                Event::Start(start) => {
                    let element = ParsedElement::from_start(&start, &entities).map_err(malformed)?;
                    open.push(element);
                }
                Event::Empty(start) => {
                    let element = ParsedElement::from_start(&start, &entities).map_err(malformed)?;
                    attach(&mut open, &mut roots, element);
                }
                Event::End(_) => {
                    // quick-xml rejects unmatched end tags before we get here.
                    if let Some(element) = open.pop() {
                        attach(&mut open, &mut roots, element);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(element) = open.pop() {
            return Err(ParseError::Unclosed(element.tag));
        }
        roots
            .into_iter()
            .find_map(ParsedElement::into_svg)
            .ok_or(ParseError::MissingRoot)
    }
}

fn attach(open: &mut [ParsedElement], roots: &mut Vec<ParsedElement>, element: ParsedElement) {
    if NON_RENDERING.contains(&element.tag.as_str()) {
        return;
    }
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}
