//! Error types for TOC composition.

use std::path::PathBuf;

/// Fatal project configuration problem detected during composition.
///
/// These are never auto-corrected: the operator has to fix the project.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The MS Help Viewer root content container is visible in the TOC.
    #[error(
        "The project's root content container topic (ID={id}) must have its Visible property \
         set to False in the content layout file."
    )]
    RootContainerVisible {
        /// Root content container topic id.
        id: String,
    },

    /// No default topic could be found in the merged TOC or the build output.
    #[error(
        "Unable to determine default topic in toc.xml. You may need to mark one as the default \
         topic manually."
    )]
    DefaultTopicUnresolved,
}

impl ConfigurationError {
    /// Diagnostic code reported with the error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RootContainerVisible { .. } => "BE0069",
            Self::DefaultTopicUnresolved => "BE0026",
        }
    }
}

/// Error while loading, composing or saving a TOC.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TocError {
    /// Reading a TOC file failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Serialized TOC was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// An attribute value could not be interpreted.
    #[error("invalid value '{value}' for attribute '{name}'")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Offending value.
        value: String,
    },

    /// The document ended inside an element.
    #[error("unclosed <{0}> element")]
    Unclosed(String),

    /// Fatal configuration error.
    #[error("{}: {}", .0.code(), .0)]
    Configuration(#[from] ConfigurationError),
}

impl TocError {
    /// Diagnostic code for configuration errors.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Configuration(err) => Some(err.code()),
            _ => None,
        }
    }
}
