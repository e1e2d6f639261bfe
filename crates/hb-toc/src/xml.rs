//! Intermediate TOC file format.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <topics>
//!   <topic id="guide" title="Guide" sortOrder="0">
//!     <topic id="install" file="install" />
//!   </topic>
//! </topics>
//! ```
//!
//! Optional attributes carried by conceptual trees: `visible="false"`,
//! `apiParentMode`, `rootContainer`. Unknown elements are ignored on read.
//! Unknown attributes are kept on the entry and written back after the known
//! ones. Default-valued attributes are omitted on write.

use std::io::Write as _;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entry::{ApiParentMode, Toc, TocEntry, UNSET_SORT_ORDER};
use crate::error::TocError;

const TOPIC: &[u8] = b"topic";

/// Parse an intermediate TOC document.
///
/// # Errors
///
/// Returns an error if the XML is malformed or an attribute value is invalid.
pub fn parse_toc(xml: &str) -> Result<Toc, TocError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<TocEntry> = Vec::new();
    let mut roots = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == TOPIC => {
                stack.push(entry_from_element(&reader, &e)?);
            }
            Event::Empty(e) if e.name().as_ref() == TOPIC => {
                let entry = entry_from_element(&reader, &e)?;
                attach(&mut stack, &mut roots, entry);
            }
            Event::End(e) if e.name().as_ref() == TOPIC => {
                if let Some(entry) = stack.pop() {
                    attach(&mut stack, &mut roots, entry);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(TocError::Unclosed("topic".to_owned()));
    }

    Ok(Toc::new(roots))
}

/// Read an intermediate TOC file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_toc(path: &Path) -> Result<Toc, TocError> {
    let content = std::fs::read_to_string(path).map_err(|source| TocError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toc(&content)
}

/// Read an intermediate TOC file, treating a missing file as absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_toc_if_exists(path: &Path) -> Result<Option<Toc>, TocError> {
    if !path.exists() {
        tracing::debug!("TOC file {} not found", path.display());
        return Ok(None);
    }
    read_toc(path).map(Some)
}

/// Serialize a TOC to the intermediate format.
///
/// # Errors
///
/// Returns an error only if the XML writer fails.
pub fn to_xml(toc: &Toc) -> Result<String, TocError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    if toc.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("topics")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("topics")))?;
        for entry in toc.entries() {
            write_entry(&mut writer, entry)?;
        }
        writer.write_event(Event::End(BytesEnd::new("topics")))?;
    }

    let mut buf = writer.into_inner();
    buf.push(b'\n');
    Ok(String::from_utf8(buf)?)
}

/// Write a TOC to disk, replacing the file atomically.
///
/// The content is written to a temporary file in the same directory and then
/// renamed over `path`, so readers never observe a truncated TOC.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub fn save_toc(toc: &Toc, path: &Path) -> Result<(), TocError> {
    let xml = to_xml(toc)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(xml.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;

    tracing::debug!("Saved TOC with {} top-level entries to {}", toc.len(), path.display());
    Ok(())
}

fn attach(stack: &mut [TocEntry], roots: &mut Vec<TocEntry>, entry: TocEntry) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(entry),
        None => roots.push(entry),
    }
}

fn entry_from_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Result<TocEntry, TocError> {
    let mut entry = TocEntry::new(String::new());

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.decode_and_unescape_value(reader.decoder())?;
        match attr.key.as_ref() {
            b"id" => entry.id = value.into_owned(),
            b"title" => entry.title = value.into_owned(),
            b"file" => entry.file = Some(value.into_owned()),
            b"sortOrder" => entry.sort_order = parse_attr("sortOrder", &value)?,
            b"visible" => entry.visible = parse_bool("visible", &value)?,
            b"apiParentMode" => entry.api_parent_mode = value.parse()?,
            b"rootContainer" => entry.root_container = Some(value.into_owned()),
            key => entry
                .extra_attributes
                .push((String::from_utf8_lossy(key).into_owned(), value.into_owned())),
        }
    }

    Ok(entry)
}

fn parse_attr<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, TocError> {
    value.trim().parse().map_err(|_| TocError::InvalidAttribute {
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, TocError> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(TocError::InvalidAttribute {
            name: name.to_owned(),
            value: value.to_owned(),
        }),
    }
}

fn write_entry<W: std::io::Write>(writer: &mut Writer<W>, entry: &TocEntry) -> Result<(), TocError> {
    let sort_order = entry.sort_order.to_string();
    let mut start = BytesStart::new("topic");
    start.push_attribute(("id", entry.id.as_str()));
    if let Some(file) = &entry.file {
        start.push_attribute(("file", file.as_str()));
    }
    if !entry.title.is_empty() {
        start.push_attribute(("title", entry.title.as_str()));
    }
    if entry.sort_order != UNSET_SORT_ORDER {
        start.push_attribute(("sortOrder", sort_order.as_str()));
    }
    if !entry.visible {
        start.push_attribute(("visible", "false"));
    }
    if entry.api_parent_mode != ApiParentMode::None {
        start.push_attribute(("apiParentMode", entry.api_parent_mode.as_str()));
    }
    if let Some(root) = &entry.root_container {
        start.push_attribute(("rootContainer", root.as_str()));
    }
    for (name, value) in &entry.extra_attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if entry.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &entry.children {
            write_entry(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new("topic")))?;
    }
    Ok(())
}
