use std::fmt;
use std::path::Path;

/// Document formats the tool knows how to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Word Open XML package (`.docx`)
    Word,
    /// Portable Document Format (`.pdf`)
    Pdf,
}

impl DocumentKind {
    /// Classify a path by its extension alone, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentKind::Word)
        } else if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }

    /// Cargo feature that compiles in the codec for this kind.
    pub fn feature(self) -> &'static str {
        match self {
            DocumentKind::Word => "docx",
            DocumentKind::Pdf => "pdf",
        }
    }

    /// What a codec of this kind removes, for status lines.
    pub fn removed_noun(self) -> &'static str {
        match self {
            DocumentKind::Word => "hyperlink",
            DocumentKind::Pdf => "annotation",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Word => f.write_str(".docx"),
            DocumentKind::Pdf => f.write_str("PDF"),
        }
    }
}
