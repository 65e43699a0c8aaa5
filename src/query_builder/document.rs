//! FetchXML-style query documents.
//!
//! A [`QueryDocument`] is validated query text whose root element can carry
//! paging attributes. The text is kept verbatim; the only rewrite ever applied
//! to it is the root element replacement performed by
//! [`QueryCursorBuilder`](super::QueryCursorBuilder).

use crate::error::{Result, SchedulerError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt;
use std::str::FromStr;

/// Validated declarative query document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument {
    text: String,
    root_name: String,
    root_attributes: Vec<(String, String)>,
}

impl QueryDocument {
    /// Parse query text, requiring a well-formed document with a root element
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let mut root_name = String::new();
        let mut root_attributes = Vec::new();

        rewrite_root(&text, |root| {
            root_name = element_name(root)?;
            for attr in root.attributes() {
                let attr = attr.map_err(SchedulerError::malformed_query)?;
                let key = std::str::from_utf8(attr.key.as_ref())
                    .map_err(SchedulerError::malformed_query)?
                    .to_string();
                let value = attr
                    .unescape_value()
                    .map_err(SchedulerError::malformed_query)?
                    .into_owned();
                root_attributes.push((key, value));
            }
            Ok(root.to_owned())
        })?;

        Ok(Self {
            text,
            root_name,
            root_attributes,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Name of the root element, e.g. `fetch`
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Unescaped value of a root element attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.root_attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Root element attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.root_attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of times an attribute name occurs on the root element
    pub fn attribute_count(&self, name: &str) -> usize {
        self.root_attributes
            .iter()
            .filter(|(key, _)| key == name)
            .count()
    }
}

impl FromStr for QueryDocument {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub(crate) fn element_name(element: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_string)
        .map_err(SchedulerError::malformed_query)
}

/// Stream `text` through a reader/writer pair, replacing the root element
/// start tag with whatever `on_root` returns. Every other event is written
/// back unchanged.
pub(crate) fn rewrite_root<F>(text: &str, mut on_root: F) -> Result<String>
where
    F: FnMut(&BytesStart<'_>) -> Result<BytesStart<'static>>,
{
    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Vec::with_capacity(text.len() + 64));
    let mut seen_root = false;
    let mut depth: usize = 0;

    loop {
        let event = reader.read_event().map_err(|e| {
            SchedulerError::malformed_query(format!(
                "parse error at position {}: {e}",
                reader.error_position()
            ))
        })?;

        let event = match event {
            Event::Eof => break,
            Event::Start(element) if !seen_root => {
                seen_root = true;
                depth += 1;
                Event::Start(on_root(&element)?)
            }
            Event::Empty(element) if !seen_root => {
                seen_root = true;
                Event::Empty(on_root(&element)?)
            }
            Event::Start(_) | Event::Empty(_) if depth == 0 => {
                return Err(SchedulerError::malformed_query(
                    "document has more than one root element",
                ));
            }
            Event::Start(element) => {
                depth += 1;
                Event::Start(element)
            }
            Event::End(element) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    SchedulerError::malformed_query("closing tag without matching opening tag")
                })?;
                Event::End(element)
            }
            Event::Text(text) if !seen_root || depth > 0 => Event::Text(text),
            Event::Text(text) => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(SchedulerError::malformed_query(
                        "content after the root element",
                    ));
                }
                Event::Text(text)
            }
            other => other,
        };

        writer
            .write_event(event)
            .map_err(|e| SchedulerError::malformed_query(format!("failed to write query: {e}")))?;
    }

    if !seen_root {
        return Err(SchedulerError::malformed_query(
            "document has no root element",
        ));
    }
    if depth != 0 {
        return Err(SchedulerError::malformed_query(format!(
            "{depth} element(s) left unclosed"
        )));
    }

    String::from_utf8(writer.into_inner()).map_err(SchedulerError::malformed_query)
}
