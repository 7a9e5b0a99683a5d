use crate::codec::Codecs;
use crate::error::{CodecError, Error};
use crate::kind::DocumentKind;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error};

/// A file found in the input directory
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// File name for display (lossy if the name is not UTF-8)
    pub name: String,
    pub path: PathBuf,
    /// `None` when the extension is not one the tool handles
    pub kind: Option<DocumentKind>,
}

impl FileRecord {
    /// `None` for paths without a file name component (`/`, `..`).
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let kind = DocumentKind::from_path(&path);
        Some(Self { name, path, kind })
    }

    fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }

    /// Why this file is never handed to a codec, if it is not.
    ///
    /// Only the extension counts, so dot-files such as `.draft.pdf` are processed.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.kind {
            Some(_) => None,
            None => Some(SkipReason::Unsupported),
        }
    }

    /// Counted in the batch total.
    pub fn is_candidate(&self) -> bool {
        self.skip_reason().is_none()
    }

    /// Same file name inside `dir`.
    pub fn destination_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither `.docx` nor `.pdf`
    Unsupported,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unsupported => f.write_str("unsupported file type"),
        }
    }
}

/// What happened to one file
#[derive(Debug)]
pub enum Outcome {
    /// Stripped output written to `output`; the original may be relocated.
    Success {
        kind: DocumentKind,
        removed: usize,
        output: PathBuf,
    },
    /// Never handed to a codec; the original stays where it is.
    Skipped(SkipReason),
    /// Processing failed; the original stays in the input directory.
    Failed(Error),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Routes files to the codec for their kind and writes the result.
pub struct Dispatcher<'a> {
    codecs: &'a Codecs,
    output_dir: &'a Path,
}

impl<'a> Dispatcher<'a> {
    pub fn new(codecs: &'a Codecs, output_dir: &'a Path) -> Self {
        Self { codecs, output_dir }
    }

    pub fn dispatch(&self, file: &FileRecord) -> Outcome {
        if let Some(reason) = file.skip_reason() {
            debug!(file = %file.name, %reason, "skipping");
            return Outcome::Skipped(reason);
        }
        let Some(kind) = file.kind else {
            return Outcome::Skipped(SkipReason::Unsupported);
        };

        match self.strip_to_output(file, kind) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(file = %file.name, error = %e, "failed to strip links");
                Outcome::Failed(e)
            }
        }
    }

    fn strip_to_output(&self, file: &FileRecord, kind: DocumentKind) -> Result<Outcome, Error> {
        let codec = self.codecs.get(kind)?;

        let malformed = |source: CodecError| Error::MalformedInput {
            path: file.path.clone(),
            source,
        };
        let input = fs::read(&file.path).map_err(|e| malformed(CodecError::Io(e)))?;
        let stripped = codec.strip(&input).map_err(malformed)?;

        let output = file.destination_in(self.output_dir);
        write_output(self.output_dir, &output, &stripped.bytes)?;

        Ok(Outcome::Success {
            kind,
            removed: stripped.removed,
            output,
        })
    }
}

/// Write through a temporary file in `dir` so `path` is either the old file or the complete new one.
fn write_output(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let failed = |source: std::io::Error| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(failed)?;
    tmp.write_all(bytes).map_err(failed)?;
    tmp.persist(path).map_err(|e| failed(e.error))?;
    Ok(())
}
