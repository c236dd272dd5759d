use serde::{Deserialize, Serialize};

/// Metadata of a user-supplied document.
///
/// The core never reads file contents; name, size and declared MIME type
/// are all the validators look at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub mime_type: String,
}

/// How a presentation layer should preview an attached document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewKind {
    /// Render the image itself.
    Image,
    /// Show a generic document icon (PDF and everything else).
    Document,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    pub fn preview_kind(&self) -> PreviewKind {
        if self.mime_type.starts_with("image/") {
            PreviewKind::Image
        } else {
            PreviewKind::Document
        }
    }

    /// Size in mebibytes with two decimals, e.g. `"2.00 MB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / (1024.0 * 1024.0))
    }
}
