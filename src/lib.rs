//! # link-remover
//!
//! Strip hyperlinks from Word (`.docx`) and PDF documents while keeping the
//! visible text, in batches driven by a folder convention.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input/
//!  │
//!  ├─ 1. Scan      regular files, sorted by name (non-recursive)
//!  ├─ 2. Dispatch  classify by extension, pick the codec for the kind
//!  ├─ 3. Strip     .docx: unwrap w:hyperlink, force runs black
//!  │               .pdf:  drop every page's /Annots
//!  ├─ 4. Write     out/<name>, via a temporary file
//!  └─ 5. Relocate  input/<name> → done/<name>
//! ```
//!
//! A file that fails at any step stays in `input/` and is retried by the next
//! run; the rest of the batch carries on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use link_remover::{run, Codecs, Layout, NoProgress};
//!
//! let layout = Layout::under(std::path::Path::new("."));
//! let report = run(&layout, &Codecs::builtin(), &NoProgress)?;
//! println!("{report} files processed");
//! # Ok::<(), link_remover::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `docx`  | on      | Word codec (`zip` + `quick-xml`) |
//! | `pdf`   | on      | PDF codec (`lopdf`) |
//! | `cli`   | on      | The `link-remover` binary (clap + anyhow + tracing-subscriber) |
//!
//! Without `docx` or `pdf`, files of that kind fail with
//! [`Error::CodecUnavailable`] rather than being silently ignored.

pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod kind;
pub mod pipeline;
pub mod progress;

#[cfg(feature = "docx")]
pub mod docx;
#[cfg(feature = "docx")]
pub mod docx_links;
#[cfg(feature = "docx")]
pub mod xml_tree;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use codec::{Codecs, DocumentCodec, Stripped};
pub use dispatcher::{Dispatcher, FileRecord, Outcome, SkipReason};
pub use error::{CodecError, Error, Result};
pub use kind::DocumentKind;
pub use pipeline::{run, BatchReport, Layout};
pub use progress::{BatchProgress, NoProgress};

#[cfg(feature = "docx")]
pub use docx::WordCodec;
#[cfg(feature = "pdf")]
pub use pdf::PdfCodec;
