//! Handler selection by file extension

use std::fmt;

/// External handler responsible for one family of upload types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Image,
    Pdf,
}

impl HandlerKind {
    /// Map a lowercase extension (without the dot) to its handler
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        file_extension(filename).and_then(|ext| Self::from_extension(&ext))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased text after the last `.` of the file's base name
///
/// Returns `None` when the name has no dot or ends with one.
pub fn file_extension(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}
