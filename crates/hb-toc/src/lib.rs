//! Table of contents composition for HB.
//!
//! This crate provides:
//! - [`Toc`] / [`TocEntry`]: ordered topic hierarchy shared by the conceptual
//!   tree, the API tree and the merged result
//! - [`resolve_placement`]: decides where the API subtree attaches
//! - [`merge_tocs`]: splices the API subtree into the conceptual tree
//! - [`resolve_default_topic`]: finds a landing page in build output
//! - [`render_html_toc`]: collapsible HTML tree view for website output
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use hb_toc::{
//!     ContentPlacement, HelpFormats, PlacementSettings, annotate_api_toc, merge_tocs,
//!     parse_toc, resolve_placement,
//! };
//!
//! let conceptual = parse_toc(r#"<topics><topic id="intro" file="intro" /></topics>"#)?;
//! let api = parse_toc(r#"<topics><topic id="N:Demo" file="N_Demo" /></topics>"#)?;
//!
//! let settings = PlacementSettings {
//!     toc_order: -1,
//!     content_placement: ContentPlacement::AboveNamespaces,
//!     formats: HelpFormats::empty(),
//! };
//! let placement = resolve_placement(&conceptual, api.len(), &settings)?;
//! let api = annotate_api_toc(&api, &placement.decision);
//!
//! let merged = merge_tocs(
//!     Some(placement.conceptual),
//!     api,
//!     &placement.decision,
//!     settings.formats,
//! );
//! assert_eq!(merged.ids(), vec!["intro", "N:Demo"]);
//! # Ok(())
//! # }
//! ```

mod default_topic;
mod entry;
mod error;
mod format;
mod html;
mod merge;
mod placement;
mod webtoc;
mod xml;

pub use default_topic::{OutputLocator, default_topic_candidate, resolve_default_topic};
pub use entry::{Anchor, ApiParentMode, Toc, TocEntry, UNSET_SORT_ORDER};
pub use error::{ConfigurationError, TocError};
pub use format::{ContentPlacement, HelpFormat, HelpFormats};
pub use html::{CONTENT_FRAME, TreeViewNode, escape_html, render_html_toc};
pub use merge::{lift_root_container, merge_tocs, normalize_containers, prune_empty_containers};
pub use placement::{
    ApiAttachment, Placement, PlacementDecision, PlacementSettings, ROOT_PARENT_ID,
    annotate_api_toc, resolve_placement,
};
pub use webtoc::{WebTocEntry, parse_web_toc, read_web_toc};
pub use xml::{parse_toc, read_toc, read_toc_if_exists, save_toc, to_xml};
