//! Parsed PubMed documents.
//!
//! A [`RawRecord`] is an immutable element tree built from efetch XML with
//! `quick-xml`. Fields are read with a small path syntax:
//!
//! - `//Name/Child` - every `Name` anywhere in the document, then child steps
//! - `/Root/Child` - child steps from the document node
//! - `Child/Grandchild` - child steps from the element being queried
//!
//! A step of `*` matches any element name.

use crate::error::{OptionExt, PubmedError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// Index of a node in the record arena. Node 0 is the document node.
type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Text(String),
    Child(NodeId),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    name: String,
    content: Vec<Content>,
    /// One past the last descendant. Nodes are stored in document order,
    /// so a subtree is the contiguous range `id + 1..end`.
    end: NodeId,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            content: Vec::new(),
            end: 0,
        }
    }
}

/// One parsed bibliographic document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    nodes: Vec<Node>,
}

impl RawRecord {
    /// Parse an XML document.
    ///
    /// # Errors
    ///
    /// Returns [`PubmedError::Parse`] for ill-formed XML or a document with
    /// no element at all.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut nodes = vec![Node::new(String::new())];
        let mut stack: Vec<NodeId> = vec![0];

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let id = open_node(&mut nodes, &stack, name);
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let id = open_node(&mut nodes, &stack, name);
                    nodes[id].end = id + 1;
                }
                Event::End(_) => {
                    let id = stack
                        .pop()
                        .filter(|&id| id != 0)
                        .ok_or_parse("closing tag without matching opening tag")?;
                    nodes[id].end = nodes.len();
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| decode_text(&String::from_utf8_lossy(&e)));
                    push_text(&mut nodes, &stack, text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    push_text(&mut nodes, &stack, text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() > 1 {
            return Err(PubmedError::Parse(format!(
                "unexpected end of document inside <{}>",
                nodes[stack[stack.len() - 1]].name
            )));
        }
        if nodes.len() == 1 {
            return Err(PubmedError::Parse("document has no root element".to_string()));
        }

        nodes[0].end = nodes.len();
        debug!(nodes = nodes.len(), "Parsed XML document");
        Ok(Self { nodes })
    }

    /// Parse an efetch `PubmedArticleSet` into one record per article,
    /// keyed by PMID, in document order.
    pub fn parse_article_set(xml: &str) -> Result<Vec<(String, RawRecord)>> {
        let set = Self::parse(xml)?;
        set.select("//PubmedArticle")
            .into_iter()
            .map(|article| {
                let pmid = article
                    .select_text("MedlineCitation/PMID")
                    .ok_or_parse("PubmedArticle without MedlineCitation/PMID")?;
                Ok((pmid, set.subtree(article.id)))
            })
            .collect()
    }

    /// Elements matching `path`, in document order.
    pub fn select(&self, path: &str) -> Vec<Element<'_>> {
        self.element(0).select(path)
    }

    /// Text of the first matching element with non-empty text.
    pub fn select_text(&self, path: &str) -> Option<String> {
        self.element(0).select_text(path)
    }

    /// Texts of all matching elements, skipping empty ones.
    pub fn select_all_text(&self, path: &str) -> Vec<String> {
        self.element(0).select_all_text(path)
    }

    /// Author sub-records from `//AuthorList/Author`, in document order.
    pub fn authors(&self) -> Vec<RawAuthor> {
        self.select("//AuthorList/Author")
            .into_iter()
            .map(RawAuthor::from_element)
            .collect()
    }

    fn element(&self, id: NodeId) -> Element<'_> {
        Element { record: self, id }
    }

    fn children(&self, id: NodeId, step: &str) -> Vec<NodeId> {
        self.nodes[id]
            .content
            .iter()
            .filter_map(|c| match c {
                Content::Child(child) if matches_step(&self.nodes[*child].name, step) => {
                    Some(*child)
                }
                _ => None,
            })
            .collect()
    }

    fn descendants(&self, id: NodeId, step: &str) -> Vec<NodeId> {
        (id + 1..self.nodes[id].end)
            .filter(|&d| matches_step(&self.nodes[d].name, step))
            .collect()
    }

    /// All descendant text in document order.
    fn string_value(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![self.nodes[id].content.iter()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                Some(Content::Text(t)) => out.push_str(t),
                Some(Content::Child(child)) => stack.push(self.nodes[*child].content.iter()),
                None => {
                    stack.pop();
                }
            }
        }
        out
    }

    /// Copy the subtree rooted at `id` into a standalone record.
    fn subtree(&self, id: NodeId) -> RawRecord {
        let end = self.nodes[id].end;
        let shift = |n: NodeId| n - id + 1;

        let mut nodes = Vec::with_capacity(end - id + 1);
        nodes.push(Node {
            name: String::new(),
            content: vec![Content::Child(1)],
            end: end - id + 1,
        });
        nodes.extend(self.nodes[id..end].iter().map(|node| Node {
            name: node.name.clone(),
            content: node
                .content
                .iter()
                .map(|c| match c {
                    Content::Text(t) => Content::Text(t.clone()),
                    Content::Child(child) => Content::Child(shift(*child)),
                })
                .collect(),
            end: shift(node.end),
        }));

        RawRecord { nodes }
    }
}

fn open_node(nodes: &mut Vec<Node>, stack: &[NodeId], name: String) -> NodeId {
    let id = nodes.len();
    nodes.push(Node::new(name));
    if let Some(&parent) = stack.last() {
        nodes[parent].content.push(Content::Child(id));
    }
    id
}

fn push_text(nodes: &mut [Node], stack: &[NodeId], text: String) {
    match stack.last() {
        // Text outside the root element (prolog whitespace) carries nothing.
        Some(&0) | None => {}
        Some(&id) => nodes[id].content.push(Content::Text(text)),
    }
}

/// Decode character references one at a time. Used when the whole text
/// fails to unescape, typically because of an HTML entity such as `&nbsp;`
/// that XML does not define. Unknown references are kept as written.
fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let end = tail[1..]
            .find(|c: char| c == ';' || c == '&')
            .map(|i| i + 1)
            .filter(|&i| tail.as_bytes()[i] == b';');
        match end {
            Some(i) => {
                let reference = &tail[..=i];
                match quick_xml::escape::unescape(reference) {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(_) => out.push_str(reference),
                }
                rest = &tail[i + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn matches_step(name: &str, step: &str) -> bool {
    step == "*" || name == step
}

/// Borrowed view of one element inside a [`RawRecord`].
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    record: &'a RawRecord,
    id: NodeId,
}

impl<'a> Element<'a> {
    /// Tag name
    pub fn name(&self) -> &'a str {
        &self.record.nodes[self.id].name
    }

    /// Concatenated descendant text, trimmed. `None` when empty.
    pub fn text(&self) -> Option<String> {
        let out = self.record.string_value(self.id);
        let trimmed = out.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Elements matching `path`, evaluated from this element.
    pub fn select(&self, path: &str) -> Vec<Element<'a>> {
        let (start, descendant, rest) = if let Some(rest) = path.strip_prefix("//") {
            (0, true, rest)
        } else if let Some(rest) = path.strip_prefix('/') {
            (0, false, rest)
        } else {
            (self.id, false, path)
        };

        let mut steps = rest.split('/').filter(|s| !s.is_empty());
        let Some(first) = steps.next() else {
            return Vec::new();
        };

        let mut current = if descendant {
            self.record.descendants(start, first)
        } else {
            self.record.children(start, first)
        };
        for step in steps {
            current = current
                .into_iter()
                .flat_map(|id| self.record.children(id, step))
                .collect();
        }

        current
            .into_iter()
            .map(|id| self.record.element(id))
            .collect()
    }

    /// Text of the first matching element with non-empty text.
    pub fn select_text(&self, path: &str) -> Option<String> {
        self.select(path).into_iter().find_map(|e| e.text())
    }

    /// Texts of all matching elements, skipping empty ones.
    pub fn select_all_text(&self, path: &str) -> Vec<String> {
        self.select(path).into_iter().filter_map(|e| e.text()).collect()
    }
}

/// Name parts and affiliations of one `<Author>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAuthor {
    /// `LastName`
    pub last_name: Option<String>,
    /// `ForeName`
    pub first_name: Option<String>,
    /// Every `AffiliationInfo/Affiliation`, in order
    pub affiliations: Vec<String>,
}

impl RawAuthor {
    /// Read an author from its `<Author>` element.
    pub fn from_element(author: Element<'_>) -> Self {
        Self {
            last_name: author.select_text("LastName"),
            first_name: author.select_text("ForeName"),
            affiliations: author.select_all_text("AffiliationInfo/Affiliation"),
        }
    }
}
