use link_remover::{BatchProgress, BatchReport, FileRecord, Outcome};
use std::io::IsTerminal;
use std::path::PathBuf;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn paint(code: &str, s: &str) -> String {
    if std::io::stdout().is_terminal() {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn green(s: &str) -> String {
    paint("32", s)
}
fn red(s: &str) -> String {
    paint("31", s)
}
fn dim(s: &str) -> String {
    paint("2", s)
}
fn bold(s: &str) -> String {
    paint("1", s)
}

/// Status lines on stdout, one block per file.
pub struct ConsoleProgress {
    input: PathBuf,
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new(input: PathBuf, quiet: bool) -> Self {
        Self { input, quiet }
    }
}

impl BatchProgress for ConsoleProgress {
    fn on_batch_start(&self, total: usize) {
        if !self.quiet && total > 0 {
            println!("Found {} file(s) to process.\n", bold(&total.to_string()));
        }
    }

    fn on_file_start(&self, file: &FileRecord) {
        if self.quiet {
            return;
        }
        if let Some(kind) = file.kind {
            println!("Processing {kind} file: {}", file.name);
        }
    }

    fn on_file_done(&self, file: &FileRecord, outcome: &Outcome) {
        match outcome {
            Outcome::Success { kind, removed, .. } if !self.quiet => {
                let noun = kind.removed_noun();
                let plural = if *removed == 1 { "" } else { "s" };
                println!(
                    "{} Processed and moved {} to done folder {}\n",
                    green("✓"),
                    file.name,
                    dim(&format!("({removed} {noun}{plural} removed)")),
                );
            }
            Outcome::Skipped(reason) if !self.quiet => {
                println!("Skipping {}: {}\n", file.name, dim(&reason.to_string()));
            }
            Outcome::Failed(e) => {
                println!("{} Failed to process {}: {}\n", red("✗"), file.name, red(&e.to_string()));
            }
            _ => {}
        }
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        if report.is_empty() {
            println!(
                "No .docx or .pdf files found in {}.",
                self.input.display()
            );
            return;
        }
        let summary = format!("{report}");
        let summary = if report.failed == 0 {
            green(&summary)
        } else {
            red(&summary)
        };
        println!("Processing complete: {summary} files processed successfully.");
    }
}
