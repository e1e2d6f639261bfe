//! API content placement.
//!
//! Decides where the API subtree attaches relative to the conceptual tree and
//! assigns the sort orders that make the help formats render it there.
//!
//! Sort orders are only set on the entry where ordering changes; all
//! subsequent siblings increment from there. The base order is the project
//! TOC order, forced to 0 when unset or when a root content container is
//! declared (a root container always starts the tree).

use std::collections::BTreeMap;

use crate::entry::{Anchor, ApiParentMode, Toc, UNSET_SORT_ORDER};
use crate::error::{ConfigurationError, TocError};
use crate::format::{ContentPlacement, HelpFormat, HelpFormats};

/// Sentinel parent id for API content attached at the top level.
pub const ROOT_PARENT_ID: &str = "**Root**";

/// Project settings consumed by the placement resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementSettings {
    /// Base sort order for the whole TOC, [`UNSET_SORT_ORDER`] when unset.
    pub toc_order: i32,
    /// Policy used when no anchor topic is declared.
    pub content_placement: ContentPlacement,
    /// Requested output formats.
    pub formats: HelpFormats,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            toc_order: UNSET_SORT_ORDER,
            content_placement: ContentPlacement::default(),
            formats: HelpFormats::empty(),
        }
    }
}

/// Where the API subtree is spliced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiAttachment {
    /// No anchor: whole API subtree goes above or below the conceptual topics.
    Unparented(ContentPlacement),
    /// Top-level siblings of the conceptual topics, at `index`.
    Root {
        /// Insertion position among the top-level entries.
        index: usize,
    },
    /// Children of the conceptual topic `id`, at `index`.
    Topic {
        /// Parent topic id.
        id: String,
        /// Insertion position among the parent's children.
        index: usize,
    },
}

impl ApiAttachment {
    /// Parent id as recorded in build state ([`ROOT_PARENT_ID`] at top level).
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Unparented(_) => None,
            Self::Root { .. } => Some(ROOT_PARENT_ID),
            Self::Topic { id, .. } => Some(id),
        }
    }

    /// Structural insertion index, `None` when unparented.
    #[must_use]
    pub fn insertion_index(&self) -> Option<usize> {
        match self {
            Self::Unparented(_) => None,
            Self::Root { index } | Self::Topic { index, .. } => Some(*index),
        }
    }
}

/// Computed placement of the API subtree for one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementDecision {
    /// Attachment parent and insertion index.
    pub attachment: ApiAttachment,
    /// Sort order for the first API topic, [`UNSET_SORT_ORDER`] if none.
    pub sort_order: i32,
    /// Declared MS Help Viewer root content container.
    pub root_container_id: Option<String>,
}

impl PlacementDecision {
    /// Decision used when placement never ran: policy splice, no sort order.
    #[must_use]
    pub fn unplaced(content_placement: ContentPlacement) -> Self {
        Self {
            attachment: ApiAttachment::Unparented(content_placement),
            sort_order: UNSET_SORT_ORDER,
            root_container_id: None,
        }
    }
}

/// Result of placement: the decision plus the conceptual tree with its sort
/// orders reassigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub decision: PlacementDecision,
    pub conceptual: Toc,
}

/// Determine the best placement for the API content.
///
/// `api_topic_count` is the number of top-level API topics about to be merged.
///
/// # Errors
///
/// Returns [`ConfigurationError::RootContainerVisible`] when MS Help Viewer
/// output is requested and the declared root content container is visible.
/// Every other input degrades to a defined fallback.
pub fn resolve_placement(
    conceptual: &Toc,
    api_topic_count: usize,
    settings: &PlacementSettings,
) -> Result<Placement, TocError> {
    if conceptual.is_empty() {
        return Ok(Placement {
            decision: PlacementDecision {
                attachment: ApiAttachment::Unparented(settings.content_placement),
                sort_order: settings.toc_order,
                root_container_id: None,
            },
            conceptual: conceptual.clone(),
        });
    }

    let root_container_id = conceptual.root_container_id().map(str::to_owned);
    let base = if settings.toc_order == UNSET_SORT_ORDER || root_container_id.is_some() {
        0
    } else {
        settings.toc_order
    };

    if settings.formats.contains(HelpFormat::MsHelpViewer)
        && let Some(id) = &root_container_id
        && conceptual.find(id).is_some_and(|entry| entry.visible)
    {
        return Err(ConfigurationError::RootContainerVisible { id: id.clone() }.into());
    }

    let api_count = order(api_topic_count);
    let mut orders = BTreeMap::new();

    let (attachment, sort_order) = match conceptual.anchor() {
        Some(anchor) => {
            orders.insert(vec![0], base);
            place_at_anchor(&anchor, api_count, base, &mut orders)
        }
        None => place_by_policy(conceptual, settings.content_placement, api_count, base, &mut orders),
    };

    tracing::debug!(
        parent = ?attachment.parent_id(),
        index = ?attachment.insertion_index(),
        sort_order,
        "Resolved API content placement"
    );

    Ok(Placement {
        decision: PlacementDecision {
            attachment,
            sort_order,
            root_container_id,
        },
        conceptual: conceptual.with_sort_orders(&orders),
    })
}

/// Copy of the API tree with the decision's sort order set on its first
/// top-level topic.
#[must_use]
pub fn annotate_api_toc(api: &Toc, decision: &PlacementDecision) -> Toc {
    let mut entries = api.entries().to_vec();
    if decision.sort_order != UNSET_SORT_ORDER
        && let Some(first) = entries.first_mut()
    {
        first.sort_order = decision.sort_order;
    }
    Toc::new(entries)
}

fn place_at_anchor(
    anchor: &Anchor<'_>,
    api_count: i32,
    base: i32,
    orders: &mut BTreeMap<Vec<usize>, i32>,
) -> (ApiAttachment, i32) {
    let at_root = anchor.parent.is_none();
    let offset = if at_root { base } else { 0 };
    let attach = |index: usize| match anchor.parent {
        None => ApiAttachment::Root { index },
        Some(parent) => ApiAttachment::Topic {
            id: parent.id.clone(),
            index,
        },
    };

    match anchor.entry.api_parent_mode {
        ApiParentMode::InsertBefore => {
            let index = anchor.position;
            let sort_order = offset + order(index);
            orders.insert(anchor.path.clone(), sort_order + api_count);
            (attach(index), sort_order)
        }
        ApiParentMode::InsertAfter => {
            let index = anchor.position + 1;
            if index < anchor.sibling_count {
                orders.insert(anchor.sibling_path(index), offset + order(index) + api_count);
            }
            (attach(index), offset + order(index))
        }
        ApiParentMode::InsertAsChild | ApiParentMode::None => {
            let index = anchor.entry.children.len();
            let attachment = ApiAttachment::Topic {
                id: anchor.entry.id.clone(),
                index,
            };
            (attachment, order(index))
        }
    }
}

fn place_by_policy(
    conceptual: &Toc,
    content_placement: ContentPlacement,
    api_count: i32,
    base: i32,
    orders: &mut BTreeMap<Vec<usize>, i32>,
) -> (ApiAttachment, i32) {
    let sort_order = match content_placement {
        ContentPlacement::AboveNamespaces => {
            orders.insert(vec![0], base);
            base + order(conceptual.len())
        }
        ContentPlacement::BelowNamespaces => {
            orders.insert(vec![0], base + api_count);
            base
        }
    };
    (ApiAttachment::Unparented(content_placement), sort_order)
}

fn order(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
