//! Error types for the link-remover library.
//!
//! Two layers reflect two failure scopes:
//!
//! * [`CodecError`]: something inside a document could not be read or
//!   re-serialized (bad ZIP, malformed XML, corrupt PDF). Always scoped to
//!   one file.
//!
//! * [`Error`]: what the dispatcher and the batch pipeline report. Per-file
//!   variants end up in [`crate::dispatcher::Outcome::Failed`]; only
//!   [`Error::CreateDir`] and [`Error::ReadDir`] abort a batch.

use crate::kind::DocumentKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while stripping links from the bytes of one document.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The file is not a readable ZIP container.
    #[cfg(feature = "docx")]
    #[error("not a valid OOXML package: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An XML part could not be tokenized.
    #[cfg(feature = "docx")]
    #[error("malformed XML in '{part}': {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    /// A part every package of this kind must have is absent.
    #[error("package has no '{0}' part")]
    MissingPart(String),

    /// Start and end tags do not pair up.
    #[error("unbalanced markup in '{part}': {detail}")]
    Unbalanced { part: String, detail: String },

    /// lopdf could not load or save the document.
    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// All errors surfaced by the dispatcher and the batch pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The extension is neither `.docx` nor `.pdf`.
    #[error("unsupported file type: '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// This build carries no codec for the document kind.
    #[error("no {kind} support in this build\nRebuild with: cargo build --features {feature}")]
    CodecUnavailable {
        kind: DocumentKind,
        feature: &'static str,
    },

    /// The file could not be opened, parsed or re-serialized.
    #[error("cannot process '{}': {source}", path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// The transformed document could not be written to the output directory.
    #[error("failed to write '{}': {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The original could not be relocated to the done directory.
    #[error("failed to move '{}' to '{}': {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
