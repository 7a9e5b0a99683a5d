use crate::codec::Codecs;
use crate::dispatcher::{Dispatcher, FileRecord, Outcome};
use crate::error::{Error, Result};
use crate::progress::BatchProgress;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The three directories a batch works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Files waiting to be processed
    pub input: PathBuf,
    /// Stripped copies
    pub output: PathBuf,
    /// Originals that were processed successfully
    pub done: PathBuf,
}

impl Layout {
    /// `input/`, `out/` and `done/` under `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            input: root.join("input"),
            output: root.join("out"),
            done: root.join("done"),
        }
    }

    /// Create any of the three directories that do not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.input, &self.output, &self.done] {
            fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Tally of one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Files in the input directory that were not `.docx`/`.pdf` documents
    pub skipped: usize,
    /// `.docx` and `.pdf` files found
    pub total: usize,
}

impl BatchReport {
    /// No `.docx` or `.pdf` files were found.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub fn scan(dir: &Path) -> Result<Vec<FileRecord>> {
    let read_dir_failed = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_failed)? {
        let entry = entry.map_err(read_dir_failed)?;
        let is_file = entry.file_type().map_err(read_dir_failed)?.is_file();
        if !is_file {
            continue;
        }
        if let Some(record) = FileRecord::from_path(entry.path()) {
            files.push(record);
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Move `from` to `to`, replacing any file already at `to`.
///
/// Falls back to copy and remove when a rename is not possible, e.g. when the
/// two directories are on different filesystems. A file already at `to` is
/// only ever replaced, so it survives a failed move.
pub fn relocate(from: &Path, to: &Path) -> Result<()> {
    let failed = |source| Error::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(failed)?;
    fs::remove_file(from).map_err(failed)?;
    Ok(())
}

/// Process every file in `layout.input` one after another.
///
/// Per-file problems are recorded in the report and never stop the batch;
/// only failing to create the directories or to list the input directory is
/// an error. A file that was stripped but could not be moved to `done/`
/// counts as failed and stays in `input/` for the next run.
pub fn run(layout: &Layout, codecs: &Codecs, progress: &dyn BatchProgress) -> Result<BatchReport> {
    layout.ensure()?;
    let files = scan(&layout.input)?;

    let mut report = BatchReport {
        total: files.iter().filter(|f| f.is_candidate()).count(),
        ..BatchReport::default()
    };
    info!(input = %layout.input.display(), total = report.total, "scanned input directory");
    progress.on_batch_start(report.total);

    let dispatcher = Dispatcher::new(codecs, &layout.output);

    for file in &files {
        if file.is_candidate() {
            progress.on_file_start(file);
        }

        let outcome = match dispatcher.dispatch(file) {
            success @ Outcome::Success { .. } => {
                match relocate(&file.path, &file.destination_in(&layout.done)) {
                    Ok(()) => success,
                    Err(e) => Outcome::Failed(e),
                }
            }
            other => other,
        };

        match &outcome {
            Outcome::Success { removed, .. } => {
                info!(file = %file.name, removed, "stripped and moved to done");
                report.succeeded += 1;
            }
            Outcome::Skipped(_) => report.skipped += 1,
            Outcome::Failed(e) => {
                warn!(file = %file.name, error = %e, "left in input for the next run");
                report.failed += 1;
            }
        }
        progress.on_file_done(file, &outcome);
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "batch complete"
    );
    progress.on_batch_complete(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DocumentCodec, Stripped};
    use crate::error::CodecError;
    use crate::kind::DocumentKind;
    use crate::progress::NoProgress;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Copies PDFs through unchanged, failing on any whose body is `bad`.
    struct PickyPdf;

    impl DocumentCodec for PickyPdf {
        fn kind(&self) -> DocumentKind {
            DocumentKind::Pdf
        }

        fn strip(&self, input: &[u8]) -> std::result::Result<Stripped, CodecError> {
            if input == b"bad" {
                return Err(CodecError::MissingPart("trailer".to_string()));
            }
            Ok(Stripped {
                bytes: input.to_vec(),
                removed: 0,
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl BatchProgress for Recorder {
        fn on_batch_start(&self, total: usize) {
            self.events.borrow_mut().push(format!("start {total}"));
        }

        fn on_file_start(&self, file: &FileRecord) {
            self.events.borrow_mut().push(format!("begin {}", file.name));
        }

        fn on_file_done(&self, file: &FileRecord, outcome: &Outcome) {
            let status = match outcome {
                Outcome::Success { .. } => "ok",
                Outcome::Skipped(_) => "skip",
                Outcome::Failed(_) => "fail",
            };
            self.events.borrow_mut().push(format!("{status} {}", file.name));
        }

        fn on_batch_complete(&self, report: &BatchReport) {
            self.events.borrow_mut().push(format!("end {report}"));
        }
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn layout_uses_conventional_names() {
        let layout = Layout::under(Path::new("/srv/links"));
        assert_eq!(layout.input, Path::new("/srv/links/input"));
        assert_eq!(layout.output, Path::new("/srv/links/out"));
        assert_eq!(layout.done, Path::new("/srv/links/done"));
    }

    #[test]
    fn empty_root_gets_its_directories() {
        let root = TempDir::new().unwrap();
        let layout = Layout::under(root.path());
        let report = run(&layout, &Codecs::empty(), &NoProgress).unwrap();

        assert!(report.is_empty());
        assert_eq!(report.to_string(), "0/0");
        assert!(layout.input.is_dir() && layout.output.is_dir() && layout.done.is_dir());
    }

    #[test]
    fn scan_is_sorted_flat_and_files_only() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("b.pdf"), b"").unwrap();
        fs::write(root.path().join("a.docx"), b"").unwrap();
        fs::create_dir(root.path().join("nested.pdf")).unwrap();
        fs::write(root.path().join("nested.pdf").join("inner.pdf"), b"").unwrap();

        let found: Vec<String> = scan(root.path())
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(found, vec!["a.docx", "b.pdf"]);
    }

    #[test]
    fn scanning_a_missing_directory_is_an_error() {
        let root = TempDir::new().unwrap();
        assert!(matches!(
            scan(&root.path().join("gone")),
            Err(Error::ReadDir { .. })
        ));
    }

    #[test]
    fn failures_stay_behind_and_the_batch_continues() {
        let root = TempDir::new().unwrap();
        let layout = Layout::under(root.path());
        layout.ensure().unwrap();
        fs::write(layout.input.join("1.pdf"), b"good one").unwrap();
        fs::write(layout.input.join("2.pdf"), b"bad").unwrap();
        fs::write(layout.input.join("3.pdf"), b"good three").unwrap();
        fs::write(layout.input.join("notes.txt"), b"hi").unwrap();

        let recorder = Recorder::default();
        let codecs = Codecs::empty().with(PickyPdf);
        let report = run(&layout, &codecs, &recorder).unwrap();

        assert_eq!(
            report,
            BatchReport {
                succeeded: 2,
                failed: 1,
                skipped: 1,
                total: 3
            }
        );
        assert_eq!(names(&layout.input), vec!["2.pdf", "notes.txt"]);
        assert_eq!(names(&layout.output), vec!["1.pdf", "3.pdf"]);
        assert_eq!(names(&layout.done), vec!["1.pdf", "3.pdf"]);
        assert_eq!(
            recorder.events.into_inner(),
            vec![
                "start 3",
                "begin 1.pdf",
                "ok 1.pdf",
                "begin 2.pdf",
                "fail 2.pdf",
                "begin 3.pdf",
                "ok 3.pdf",
                "skip notes.txt",
                "end 2/3",
            ]
        );
    }

    #[test]
    fn done_collisions_are_overwritten() {
        let root = TempDir::new().unwrap();
        let layout = Layout::under(root.path());
        layout.ensure().unwrap();
        fs::write(layout.input.join("x.pdf"), b"fresh").unwrap();
        fs::write(layout.done.join("x.pdf"), b"older original").unwrap();

        let report = run(&layout, &Codecs::empty().with(PickyPdf), &NoProgress).unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(fs::read(layout.done.join("x.pdf")).unwrap(), b"fresh");
        assert!(names(&layout.input).is_empty());
    }

    #[test]
    fn relocate_moves_the_file() {
        let root = TempDir::new().unwrap();
        let from = root.path().join("a.pdf");
        let to = root.path().join("moved.pdf");
        fs::write(&from, b"x").unwrap();

        relocate(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"x");
    }

    #[test]
    fn failed_move_leaves_output_and_original_in_place() {
        let root = TempDir::new().unwrap();
        let layout = Layout::under(root.path());
        layout.ensure().unwrap();
        fs::write(layout.input.join("x.pdf"), b"body").unwrap();
        // A non-empty directory cannot be replaced by a file
        fs::create_dir(layout.done.join("x.pdf")).unwrap();
        fs::write(layout.done.join("x.pdf").join("keep"), b"").unwrap();

        let recorder = Recorder::default();
        let report = run(&layout, &Codecs::empty().with(PickyPdf), &recorder).unwrap();

        assert_eq!(report.to_string(), "0/1");
        assert_eq!(report.failed, 1);
        assert_eq!(names(&layout.input), vec!["x.pdf"]);
        assert_eq!(names(&layout.output), vec!["x.pdf"]);
        assert_eq!(fs::read(layout.output.join("x.pdf")).unwrap(), b"body");
        assert!(layout.done.join("x.pdf").join("keep").exists());
        assert_eq!(
            recorder.events.into_inner(),
            vec!["start 1", "begin x.pdf", "fail x.pdf", "end 0/1"]
        );
    }

    #[test]
    fn failed_move_reports_both_paths() {
        let root = TempDir::new().unwrap();
        let from = root.path().join("a.pdf");
        let to = root.path().join("busy");
        fs::write(&from, b"x").unwrap();
        fs::create_dir(&to).unwrap();
        fs::write(to.join("inside"), b"").unwrap();

        match relocate(&from, &to) {
            Err(Error::MoveFailed { from: f, to: t, .. }) => {
                assert_eq!(f, from);
                assert_eq!(t, to);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(from.exists());
    }

    #[test]
    fn failed_move_keeps_the_earlier_done_file() {
        let root = TempDir::new().unwrap();
        let to = root.path().join("x.pdf");
        fs::write(&to, b"older original").unwrap();

        let result = relocate(&root.path().join("vanished.pdf"), &to);
        assert!(matches!(result, Err(Error::MoveFailed { .. })));
        assert_eq!(fs::read(&to).unwrap(), b"older original");
    }
}
