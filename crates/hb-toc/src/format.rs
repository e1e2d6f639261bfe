//! Help output formats and content placement policy.

use std::fmt;

/// Where unanchored API content goes relative to the conceptual topics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ContentPlacement {
    /// Conceptual content above the namespaces (API content after it).
    #[default]
    AboveNamespaces,
    /// Conceptual content below the namespaces (API content before it).
    BelowNamespaces,
}

/// A single help output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum HelpFormat {
    /// Compiled HTML Help 1 (`.chm`).
    HtmlHelp1,
    /// MS Help 2 (`.HxS`).
    MsHelp2,
    /// MS Help Viewer (`.mshc`).
    MsHelpViewer,
    /// Static website.
    Website,
    /// Open XML document.
    OpenXml,
    /// Markdown content.
    Markdown,
}

impl HelpFormat {
    /// Every format, in output folder order.
    pub const ALL: [Self; 6] = [
        Self::HtmlHelp1,
        Self::MsHelp2,
        Self::MsHelpViewer,
        Self::Website,
        Self::OpenXml,
        Self::Markdown,
    ];

    /// Name of the per-format folder under the working `Output` folder.
    #[must_use]
    pub fn folder_name(self) -> &'static str {
        match self {
            Self::HtmlHelp1 => "HtmlHelp1",
            Self::MsHelp2 => "MSHelp2",
            Self::MsHelpViewer => "MSHelpViewer",
            Self::Website => "Website",
            Self::OpenXml => "OpenXml",
            Self::Markdown => "Markdown",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::HtmlHelp1 => 1,
            Self::MsHelp2 => 1 << 1,
            Self::MsHelpViewer => 1 << 2,
            Self::Website => 1 << 3,
            Self::OpenXml => 1 << 4,
            Self::Markdown => 1 << 5,
        }
    }
}

impl fmt::Display for HelpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Set of requested help formats.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HelpFormats(u8);

impl HelpFormats {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn contains(self, format: HelpFormat) -> bool {
        self.0 & format.bit() != 0
    }

    /// True if any format of `other` is also in `self`.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub fn with(self, format: HelpFormat) -> Self {
        Self(self.0 | format.bit())
    }

    pub fn insert(&mut self, format: HelpFormat) {
        self.0 |= format.bit();
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Requested formats in output folder order.
    pub fn iter(self) -> impl Iterator<Item = HelpFormat> {
        HelpFormat::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Debug for HelpFormats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<HelpFormat> for HelpFormats {
    fn from(format: HelpFormat) -> Self {
        Self::empty().with(format)
    }
}

impl FromIterator<HelpFormat> for HelpFormats {
    fn from_iter<I: IntoIterator<Item = HelpFormat>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}
