use clap::Parser;
use link_remover::Layout;
use std::path::PathBuf;

/// Strip hyperlinks from .docx and .pdf files in the input folder
#[derive(Parser, Debug)]
#[command(name = "link-remover", version, about)]
pub struct Cli {
    /// Folder holding input/, out/ and done/.
    /// Defaults to the current directory.
    #[arg(long, env = "LINK_REMOVER_ROOT")]
    pub root: Option<PathBuf>,

    /// Read documents from this folder instead of <root>/input
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Write stripped copies to this folder instead of <root>/out
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Move processed originals to this folder instead of <root>/done
    #[arg(long)]
    pub done: Option<PathBuf>,

    /// Enable DEBUG-level logs
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Only print errors and the final count
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn layout(&self) -> Layout {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut layout = Layout::under(&root);
        if let Some(ref input) = self.input {
            layout.input = input.clone();
        }
        if let Some(ref output) = self.output {
            layout.output = output.clone();
        }
        if let Some(ref done) = self.done {
            layout.done = done.clone();
        }
        layout
    }
}
