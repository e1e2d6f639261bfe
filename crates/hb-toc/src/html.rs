//! HTML tree view for website output.
//!
//! Renders a TOC as nested, initially collapsed `<div>` blocks driven by the
//! website's tree view script (`Toggle`, `Expand`, `SelectNode`).

use crate::entry::TocEntry;
use crate::webtoc::WebTocEntry;

/// Frame that topic links open in.
pub const CONTENT_FRAME: &str = "TopicContent";

const BLANK_PAGE: &str = "about:blank";

/// A node that can be rendered in the HTML tree view.
pub trait TreeViewNode: Sized {
    fn title(&self) -> &str;
    fn url(&self) -> Option<&str>;
    fn children(&self) -> &[Self];
}

impl TreeViewNode for WebTocEntry {
    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

impl TreeViewNode for TocEntry {
    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render nodes as an HTML tree view fragment.
///
/// Depth-first, in the given order. A node with children becomes a
/// collapsed `TreeNode` whose link expands it; a node without children
/// becomes a `TreeItem` link opening in [`CONTENT_FRAME`]. A container
/// without a URL gets a `#` link with no target; a leaf without one links to
/// a blank page.
#[must_use]
pub fn render_html_toc<N: TreeViewNode>(nodes: &[N]) -> String {
    let mut out = TreeWriter::default();
    out.nodes(nodes);
    out.finish()
}

#[derive(Default)]
struct TreeWriter {
    html: String,
}

impl TreeWriter {
    fn nodes<N: TreeViewNode>(&mut self, nodes: &[N]) {
        for node in nodes {
            if node.children().is_empty() {
                self.leaf(node);
            } else {
                self.branch(node);
            }
        }
    }

    fn branch<N: TreeViewNode>(&mut self, node: &N) {
        self.open_div("TreeNode");
        self.raw(r#"<img class="TreeNodeImg" onclick="javascript: Toggle(this);" src="Collapsed.gif"/>"#);
        match node.url().filter(|url| !url.is_empty()) {
            Some(url) => self.link("Expand", url, Some(CONTENT_FRAME), node.title()),
            None => self.link("Expand", "#", None, node.title()),
        }
        self.raw("\n");
        self.open_div("Hidden");
        self.nodes(node.children());
        self.close_div();
        self.close_div();
    }

    fn leaf<N: TreeViewNode>(&mut self, node: &N) {
        let url = node.url().filter(|url| !url.is_empty()).unwrap_or(BLANK_PAGE);
        self.open_div("TreeItem");
        self.raw(r#"<img src="Item.gif"/>"#);
        self.link("SelectNode", url, Some(CONTENT_FRAME), node.title());
        self.raw("\n");
        self.close_div();
    }

    fn link(&mut self, handler: &str, href: &str, target: Option<&str>, text: &str) {
        self.raw(r#"<a class="UnselectedNode" onclick="javascript: return "#);
        self.raw(handler);
        self.raw(r#"(this);" href=""#);
        self.text(href);
        self.raw("\"");
        if let Some(target) = target {
            self.raw(r#" target=""#);
            self.text(target);
            self.raw("\"");
        }
        self.raw(">");
        self.text(text);
        self.raw("</a>");
    }

    fn open_div(&mut self, class: &str) {
        self.raw(r#"<div class=""#);
        self.text(class);
        self.raw("\">\n");
    }

    fn close_div(&mut self) {
        self.raw("</div>\n");
    }

    fn raw(&mut self, markup: &str) {
        self.html.push_str(markup);
    }

    fn text(&mut self, text: &str) {
        self.html.push_str(&escape_html(text));
    }

    fn finish(self) -> String {
        self.html
    }
}
