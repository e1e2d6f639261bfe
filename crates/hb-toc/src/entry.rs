//! Topic hierarchy model.
//!
//! Entries are stored as an owned tree: each [`TocEntry`] holds its children
//! in render order. A [`Toc`] is the ordered list of top-level entries (the
//! children of the `<topics>` document element in the intermediate format).
//!
//! Entries are addressed either by id or by index path, where a path is the
//! sequence of child positions from the top level (`[0]` is the first
//! top-level entry, `[0, 2]` its third child).

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::TocError;

/// Sort order value meaning "unset, inherit position".
pub const UNSET_SORT_ORDER: i32 = -1;

/// How API content is parented to a conceptual anchor topic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApiParentMode {
    /// Not an anchor.
    #[default]
    None,
    /// Insert the API content before the anchor, as its sibling.
    InsertBefore,
    /// Insert the API content after the anchor, as its sibling.
    InsertAfter,
    /// Append the API content to the anchor's children.
    InsertAsChild,
}

impl ApiParentMode {
    /// Attribute value used in the intermediate TOC format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::InsertBefore => "InsertBefore",
            Self::InsertAfter => "InsertAfter",
            Self::InsertAsChild => "InsertAsChild",
        }
    }

    /// Whether an entry with this mode is an API insertion anchor.
    #[must_use]
    pub fn is_anchor(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for ApiParentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiParentMode {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" | "" => Ok(Self::None),
            "InsertBefore" => Ok(Self::InsertBefore),
            "InsertAfter" => Ok(Self::InsertAfter),
            "InsertAsChild" => Ok(Self::InsertAsChild),
            other => Err(TocError::InvalidAttribute {
                name: "apiParentMode".to_owned(),
                value: other.to_owned(),
            }),
        }
    }
}

/// A node in a topic hierarchy.
///
/// In the intermediate format only container nodes carry a title; content
/// pages are bound to a `file` and get their display title later from the
/// topic itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Identifier, unique within the owning tree.
    pub id: String,
    /// Container title (empty for content pages).
    pub title: String,
    /// Relative path of the content page, `None` for pure containers.
    pub file: Option<String>,
    /// Explicit sort order, [`UNSET_SORT_ORDER`] when inherited from position.
    pub sort_order: i32,
    /// Whether the entry is shown in the rendered TOC.
    pub visible: bool,
    /// Set only on the API insertion anchor.
    pub api_parent_mode: ApiParentMode,
    /// Id of the MS Help Viewer root content container declared by this entry.
    pub root_container: Option<String>,
    /// Attributes composition does not interpret, in document order. Kept
    /// so rewriting a TOC file does not lose them.
    pub extra_attributes: Vec<(String, String)>,
    /// Child entries in render order.
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// Create an entry with only an id set.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            file: None,
            sort_order: UNSET_SORT_ORDER,
            visible: true,
            api_parent_mode: ApiParentMode::None,
            root_container: None,
            extra_attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a content page entry bound to `file`.
    #[must_use]
    pub fn topic(id: impl Into<String>, file: impl Into<String>) -> Self {
        Self::new(id).with_file(file)
    }

    /// Create a titled container entry.
    #[must_use]
    pub fn container(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id).with_title(title)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    #[must_use]
    pub fn with_api_parent_mode(mut self, mode: ApiParentMode) -> Self {
        self.api_parent_mode = mode;
        self
    }

    #[must_use]
    pub fn with_root_container(mut self, id: impl Into<String>) -> Self {
        self.root_container = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<TocEntry>) -> Self {
        self.children = children;
        self
    }

    /// Mark the entry as hidden from the rendered TOC.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// True if this is a grouping node rather than a content page.
    #[must_use]
    pub fn is_container(&self) -> bool {
        !self.title.is_empty()
    }

    /// Find an entry by id in this subtree (pre-order).
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&TocEntry> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        for child in &self.children {
            child.collect_ids(ids);
        }
    }
}

/// A located API insertion anchor.
#[derive(Debug)]
pub struct Anchor<'a> {
    /// The anchor entry itself.
    pub entry: &'a TocEntry,
    /// The anchor's parent, `None` when the anchor is a top-level entry.
    pub parent: Option<&'a TocEntry>,
    /// Position of the anchor within its sibling collection.
    pub position: usize,
    /// Size of the sibling collection (including the anchor).
    pub sibling_count: usize,
    /// Index path of the anchor.
    pub path: Vec<usize>,
}

impl Anchor<'_> {
    /// Index path of the anchor's parent (empty at top level).
    #[must_use]
    pub fn parent_path(&self) -> &[usize] {
        &self.path[..self.path.len() - 1]
    }

    /// Index path of the sibling at `index` in the anchor collection.
    #[must_use]
    pub fn sibling_path(&self, index: usize) -> Vec<usize> {
        let mut path = self.parent_path().to_vec();
        path.push(index);
        path
    }
}

/// An ordered topic hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toc {
    entries: Vec<TocEntry>,
}

impl Toc {
    #[must_use]
    pub fn new(entries: Vec<TocEntry>) -> Self {
        Self { entries }
    }

    /// Top-level entries.
    #[must_use]
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<TocEntry> {
        self.entries
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry anywhere in the tree by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&TocEntry> {
        self.entries.iter().find_map(|entry| entry.find(id))
    }

    /// Entry at an index path.
    #[must_use]
    pub fn entry_at(&self, path: &[usize]) -> Option<&TocEntry> {
        let (&first, rest) = path.split_first()?;
        let mut entry = self.entries.get(first)?;
        for &index in rest {
            entry = entry.children.get(index)?;
        }
        Some(entry)
    }

    /// Index path of the first entry (pre-order) matching `predicate`.
    #[must_use]
    pub fn position(&self, predicate: impl Fn(&TocEntry) -> bool) -> Option<Vec<usize>> {
        fn search(
            entries: &[TocEntry],
            predicate: &dyn Fn(&TocEntry) -> bool,
            path: &mut Vec<usize>,
        ) -> bool {
            for (index, entry) in entries.iter().enumerate() {
                path.push(index);
                if predicate(entry) || search(&entry.children, predicate, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.entries, &predicate, &mut path).then_some(path)
    }

    /// The API insertion anchor, if one is declared.
    ///
    /// Only the first anchor in pre-order counts.
    #[must_use]
    pub fn anchor(&self) -> Option<Anchor<'_>> {
        let path = self.position(|entry| entry.api_parent_mode.is_anchor())?;
        let entry = self.entry_at(&path)?;
        let parent_path = &path[..path.len() - 1];
        let parent = if parent_path.is_empty() {
            None
        } else {
            self.entry_at(parent_path)
        };
        let sibling_count = parent.map_or(self.entries.len(), |p| p.children.len());

        Some(Anchor {
            entry,
            parent,
            position: path[path.len() - 1],
            sibling_count,
            path,
        })
    }

    /// Id of the declared MS Help Viewer root content container.
    #[must_use]
    pub fn root_container_id(&self) -> Option<&str> {
        let path = self.position(|entry| entry.root_container.is_some())?;
        self.entry_at(&path)?.root_container.as_deref()
    }

    /// All entry ids in pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for entry in &self.entries {
            entry.collect_ids(&mut ids);
        }
        ids
    }

    /// Ids that occur more than once, in order of their second occurrence.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.ids() {
            if !seen.insert(id) && reported.insert(id) {
                duplicates.push(id.to_owned());
            }
        }
        duplicates
    }

    /// Copy of this tree with every sort order reset to [`UNSET_SORT_ORDER`]
    /// and then the given path-addressed orders applied.
    ///
    /// Paths that do not address an entry are ignored.
    #[must_use]
    pub fn with_sort_orders(&self, orders: &BTreeMap<Vec<usize>, i32>) -> Self {
        fn reset(entries: &mut [TocEntry]) {
            for entry in entries {
                entry.sort_order = UNSET_SORT_ORDER;
                reset(&mut entry.children);
            }
        }

        let mut entries = self.entries.clone();
        reset(&mut entries);
        for (path, &order) in orders {
            if let Some(entry) = entry_at_mut(&mut entries, path) {
                entry.sort_order = order;
            }
        }
        Self { entries }
    }
}

impl From<Vec<TocEntry>> for Toc {
    fn from(entries: Vec<TocEntry>) -> Self {
        Self::new(entries)
    }
}

/// Mutable entry at an index path within an entry list.
pub(crate) fn entry_at_mut<'a>(
    entries: &'a mut [TocEntry],
    path: &[usize],
) -> Option<&'a mut TocEntry> {
    let (&first, rest) = path.split_first()?;
    let mut entry = entries.get_mut(first)?;
    for &index in rest {
        entry = entry.children.get_mut(index)?;
    }
    Some(entry)
}
