//! Conceptual + API TOC merging.
//!
//! The merge consumes both source trees and builds the merged tree from their
//! entries: API subtrees are moved into place by value, never shared.

use crate::entry::{Toc, TocEntry, entry_at_mut};
use crate::format::{ContentPlacement, HelpFormat, HelpFormats};
use crate::placement::{ApiAttachment, PlacementDecision};

/// Combine the conceptual and API trees into one.
///
/// - No (or an empty) conceptual tree: the API tree is returned as is.
/// - Empty API tree: the conceptual tree is returned as is.
/// - Otherwise the API entries are spliced per `decision`, the MS Help Viewer
///   root container wrapper is lifted when needed, and container nodes are
///   normalized.
///
/// A missing attachment parent falls back to the top level and an
/// out-of-range index clamps to append; neither is an error.
#[must_use]
pub fn merge_tocs(
    conceptual: Option<Toc>,
    api: Toc,
    decision: &PlacementDecision,
    formats: HelpFormats,
) -> Toc {
    let Some(conceptual) = conceptual.filter(|toc| !toc.is_empty()) else {
        return api;
    };
    if api.is_empty() {
        return conceptual;
    }

    let mut entries = conceptual.into_entries();
    let mut lifted = None;
    if formats.contains(HelpFormat::MsHelpViewer) && decision.root_container_id.is_some() {
        lifted = entries.first().map(|wrapper| wrapper.children.len());
        entries = lift_root_container(entries);
    }

    let api_entries = api.into_entries();
    let merged = match &decision.attachment {
        ApiAttachment::Unparented(ContentPlacement::AboveNamespaces) => {
            entries.extend(api_entries);
            entries
        }
        ApiAttachment::Unparented(ContentPlacement::BelowNamespaces) => {
            let mut merged = api_entries;
            merged.extend(entries);
            merged
        }
        ApiAttachment::Root { index } => {
            // Top-level indexes were taken with the wrapper still in place
            let index = match lifted {
                Some(count) if *index > 0 => index + count - 1,
                _ => *index,
            };
            splice(entries, index, api_entries)
        }
        ApiAttachment::Topic { id, index } => {
            let conceptual = Toc::new(entries);
            let path = conceptual.position(|entry| entry.id == *id);
            let mut entries = conceptual.into_entries();
            let parent = path.as_deref().and_then(|path| entry_at_mut(&mut entries, path));
            match parent {
                Some(parent) => {
                    let children = std::mem::take(&mut parent.children);
                    parent.children = splice(children, *index, api_entries);
                    entries
                }
                None => {
                    tracing::debug!("API parent topic '{id}' not found, parenting to the root");
                    splice(entries, *index, api_entries)
                }
            }
        }
    };

    prune_empty_containers(normalize_containers(Toc::new(merged)))
}

/// Remove the MS Help Viewer root container wrapper (the first top-level
/// entry), lifting its children to the top level in its place.
///
/// Other formats have no root container concept.
#[must_use]
pub fn lift_root_container(mut entries: Vec<TocEntry>) -> Vec<TocEntry> {
    if entries.is_empty() {
        return entries;
    }
    let wrapper = entries.remove(0);
    tracing::debug!(
        "Removing root content container '{}' ({} children lifted)",
        wrapper.id,
        wrapper.children.len()
    );
    entries.splice(0..0, wrapper.children);
    entries
}

/// Turn every titled entry into a pure container: its `file` is cleared and
/// its `id` becomes the title text.
///
/// Idempotent.
#[must_use]
pub fn normalize_containers(toc: Toc) -> Toc {
    fn normalize(entry: &mut TocEntry) {
        if entry.is_container() {
            entry.file = None;
            entry.id.clone_from(&entry.title);
        }
        entry.children.iter_mut().for_each(normalize);
    }

    let mut entries = toc.into_entries();
    entries.iter_mut().for_each(normalize);
    Toc::new(entries)
}

/// Drop entries with neither a file nor children.
///
/// Works bottom-up, so a container whose children are all pruned is pruned
/// as well.
#[must_use]
pub fn prune_empty_containers(toc: Toc) -> Toc {
    fn prune(entries: Vec<TocEntry>) -> Vec<TocEntry> {
        entries
            .into_iter()
            .filter_map(|mut entry| {
                entry.children = prune(std::mem::take(&mut entry.children));
                if entry.file.is_none() && entry.children.is_empty() {
                    tracing::debug!("Pruning empty container '{}'", entry.id);
                    None
                } else {
                    Some(entry)
                }
            })
            .collect()
    }

    Toc::new(prune(toc.into_entries()))
}

fn splice(mut siblings: Vec<TocEntry>, index: usize, inserted: Vec<TocEntry>) -> Vec<TocEntry> {
    let at = index.min(siblings.len());
    siblings.splice(at..at, inserted);
    siblings
}
