//! CLI command implementations.

pub(crate) mod compose;
pub(crate) mod render_toc;

pub(crate) use compose::ComposeArgs;
pub(crate) use render_toc::RenderTocArgs;
