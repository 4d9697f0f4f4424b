use crate::error::ParseError;
use ego_tree::{NodeId, NodeRef, Tree};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static ENTITY_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([A-Za-z_:][^\s%"'>]*)\s+(?:"([^"]*)"|'([^']*)')\s*>"#).unwrap()
});

/// An element as the extractor sees it: namespace-free name and the text that
/// precedes its first child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    /// Lower-cased `name`, used for every tag comparison.
    pub key: String,
    pub text: String,
}

impl XmlElement {
    fn new(name: String) -> Self {
        let key = name.to_lowercase();
        Self {
            name,
            key,
            text: String::new(),
        }
    }

    /// Leading text, trimmed. `None` when blank.
    pub fn trimmed_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn is(&self, key: &str) -> bool {
        self.key == key
    }
}

pub type XmlTree = Tree<XmlElement>;
pub type XmlNode<'a> = NodeRef<'a, XmlElement>;

/// Parses a whole document into an element tree. Comments, processing
/// instructions and the doctype are dropped, except that internal general
/// entities declared in the doctype are expanded in text. Anything that is
/// not well-formed is an error.
pub fn parse_document(bytes: &[u8]) -> Result<XmlTree, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);

    let mut tree: Option<XmlTree> = None;
    let mut open: Vec<NodeId> = Vec::new();
    let mut entities: HashMap<String, String> = HashMap::new();
    let mut buf = Vec::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(source) => {
                return Err(ParseError::Xml {
                    position: reader.error_position() as u64,
                    source,
                })
            }
        };

        match event {
            Event::Start(ref start) => {
                let element = element_from(&reader, start)?;
                let id = attach(&mut tree, &open, element)?;
                open.push(id);
            }
            Event::Empty(ref start) => {
                let element = element_from(&reader, start)?;
                attach(&mut tree, &open, element)?;
            }
            Event::End(ref end) => {
                if open.pop().is_none() {
                    let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                    return Err(ParseError::UnexpectedEndTag(name));
                }
            }
            Event::Text(ref text) => {
                let value = text
                    .unescape_with(|name| entities.get(name).map(String::as_str))
                    .map_err(|source| ParseError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                push_text(&mut tree, &open, &value, reader.buffer_position() as u64)?;
            }
            Event::CData(ref cdata) => {
                let value = reader
                    .decoder()
                    .decode(cdata)
                    .map_err(|e| ParseError::Encoding(e.to_string()))?;
                push_text(&mut tree, &open, &value, reader.buffer_position() as u64)?;
            }
            Event::DocType(ref doctype) => {
                let declarations = reader
                    .decoder()
                    .decode(doctype)
                    .map_err(|e| ParseError::Encoding(e.to_string()))?;
                collect_entities(&declarations, &mut entities);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let (Some(tree), Some(&id)) = (tree.as_ref(), open.last()) {
        let name = tree
            .get(id)
            .map(|node| node.value().name.clone())
            .unwrap_or_default();
        return Err(ParseError::UnclosedElement(name));
    }

    tree.ok_or(ParseError::NoRootElement)
}

fn element_from<R>(reader: &Reader<R>, start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let local = start.local_name();
    let name = reader
        .decoder()
        .decode(local.as_ref())
        .map_err(|e| ParseError::Encoding(e.to_string()))?;
    Ok(XmlElement::new(name.into_owned()))
}

/// Internal `<!ENTITY name "value">` declarations. Parameter and external
/// entities are not supported.
fn collect_entities(doctype: &str, entities: &mut HashMap<String, String>) {
    for caps in ENTITY_DECL_RE.captures_iter(doctype) {
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        // First declaration wins, as in XML.
        entities
            .entry(caps[1].to_string())
            .or_insert_with(|| value.to_string());
    }
}

fn attach(
    tree: &mut Option<XmlTree>,
    open: &[NodeId],
    element: XmlElement,
) -> Result<NodeId, ParseError> {
    match tree {
        None => {
            let created = Tree::new(element);
            let id = created.root().id();
            *tree = Some(created);
            Ok(id)
        }
        Some(existing) => {
            let Some(&parent) = open.last() else {
                return Err(ParseError::MultipleRoots(element.name));
            };
            let mut parent = existing
                .get_mut(parent)
                .expect("open element ids belong to the tree");
            Ok(parent.append(element).id())
        }
    }
}

fn push_text(
    tree: &mut Option<XmlTree>,
    open: &[NodeId],
    text: &str,
    position: u64,
) -> Result<(), ParseError> {
    let (Some(tree), Some(&id)) = (tree.as_mut(), open.last()) else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(ParseError::TextOutsideRoot(position));
    };

    // Text after the first child is tail text and is not part of `text`.
    let has_children = tree.get(id).is_some_and(|node| node.has_children());
    if !has_children {
        if let Some(mut node) = tree.get_mut(id) {
            node.value().text.push_str(text);
        }
    }
    Ok(())
}

/// First element in `node`'s subtree (the node itself included, document
/// order) whose key is one of `keys` and whose leading text is non-blank.
pub fn first_text<S: AsRef<str>>(node: XmlNode<'_>, keys: &[S]) -> Option<String> {
    node.descendants().find_map(|candidate| {
        let element = candidate.value();
        if keys.iter().any(|key| element.is(key.as_ref())) {
            element.trimmed_text().map(str::to_string)
        } else {
            None
        }
    })
}

/// Every element in `node`'s subtree (itself included) with the given key.
pub fn find_all<'a>(node: XmlNode<'a>, key: &'a str) -> impl Iterator<Item = XmlNode<'a>> + 'a {
    node.descendants().filter(move |candidate| candidate.value().is(key))
}
