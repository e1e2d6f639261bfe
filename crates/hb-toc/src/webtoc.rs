//! Website TOC (`WebTOC.xml`) reader.
//!
//! ```xml
//! <HelpTOC>
//!   <HelpTOCNode Title="Guide" Url="html/guide.htm">
//!     <HelpTOCNode Title="Install" Url="html/install.htm" />
//!   </HelpTOCNode>
//! </HelpTOC>
//! ```
//!
//! Every element below the root is a node regardless of its name.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::TocError;

/// A node of the website TOC.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebTocEntry {
    pub title: String,
    pub url: Option<String>,
    pub children: Vec<WebTocEntry>,
}

impl WebTocEntry {
    pub fn new(title: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            title: title.into(),
            url: url.map(ToOwned::to_owned),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<WebTocEntry>) -> Self {
        self.children = children;
        self
    }
}

/// Parse a `WebTOC.xml` document into its top-level nodes.
///
/// # Errors
///
/// Returns an error if the XML is malformed.
pub fn parse_web_toc(xml: &str) -> Result<Vec<WebTocEntry>, TocError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // depth 0 is outside the root element, depth 1 inside it
    let mut depth = 0usize;
    let mut stack: Vec<WebTocEntry> = Vec::new();
    let mut roots = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth > 0 {
                    stack.push(node_from_element(&reader, &e)?);
                }
                depth += 1;
            }
            Event::Empty(e) if depth > 0 => {
                let node = node_from_element(&reader, &e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => roots.push(node),
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth > 0
                    && let Some(node) = stack.pop()
                {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => roots.push(node),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(TocError::Unclosed("HelpTOC".to_owned()));
    }
    Ok(roots)
}

/// Read and parse a `WebTOC.xml` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_web_toc(path: &Path) -> Result<Vec<WebTocEntry>, TocError> {
    let content = std::fs::read_to_string(path).map_err(|source| TocError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_web_toc(&content)
}

fn node_from_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Result<WebTocEntry, TocError> {
    let mut node = WebTocEntry::default();
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"Title" => {
                node.title = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
            }
            b"Url" => {
                let url = attr.decode_and_unescape_value(reader.decoder())?;
                node.url = (!url.is_empty()).then(|| url.into_owned());
            }
            _ => {}
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_nested_nodes() {
        let xml = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>
<HelpTOC>
  <HelpTOCNode Title=\"Guide\" Url=\"html/guide.htm\">
    <HelpTOCNode Title=\"Install &amp; Setup\" Url=\"html/install.htm\" />
    <HelpTOCNode Title=\"Folder\">
      <HelpTOCNode Title=\"Deep\" Url=\"\" />
    </HelpTOCNode>
  </HelpTOCNode>
  <HelpTOCNode Title=\"Reference\" Url=\"html/ref.htm\" />
</HelpTOC>";

        let nodes = parse_web_toc(xml).unwrap();
        assert_eq!(
            nodes,
            vec![
                WebTocEntry::new("Guide", Some("html/guide.htm")).with_children(vec![
                    WebTocEntry::new("Install & Setup", Some("html/install.htm")),
                    WebTocEntry::new("Folder", None)
                        .with_children(vec![WebTocEntry::new("Deep", None)]),
                ]),
                WebTocEntry::new("Reference", Some("html/ref.htm")),
            ]
        );
    }

    #[test]
    fn test_parse_empty_root() {
        assert!(parse_web_toc("<HelpTOC />").unwrap().is_empty());
        assert!(parse_web_toc("<HelpTOC></HelpTOC>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_truncated_document() {
        assert!(parse_web_toc("<HelpTOC><HelpTOCNode Title=\"a\">").is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = read_web_toc(&temp.path().join("WebTOC.xml")).unwrap_err();
        assert!(matches!(err, TocError::Read { .. }));
    }
}
