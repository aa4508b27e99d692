mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use editor::{CollapseStore, Editor, EditorError, Extensions, JsonFileStore};
use richdoc::compute_anchors;
use richdoc::nodes::Heading;

use config::Config;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RICHDOC_LOG";

#[derive(Parser)]
#[command(name = "richdoc", version, about = "Rich-text document tool")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to a richdoc.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print `position level id` for every heading
    Anchors {
        file: PathBuf,
    },

    /// Re-serialize a document to stdout
    Fmt {
        file: PathBuf,

        /// Exit 1 instead of printing when the file is not formatted
        #[arg(long)]
        check: bool,
    },

    /// Parse only (exit 0 if valid)
    Check {
        file: PathBuf,
    },

    /// Render the document as HTML, anchors included
    Html {
        file: PathBuf,
    },

    /// Fold or unfold the heading with the given anchor id
    Fold {
        file: PathBuf,

        /// Anchor id as printed by `anchors`
        anchor: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    };
    let session = Session {
        config,
        color_choice: if cli.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        },
    };

    let code = match cli.command {
        Command::Anchors { file } => session.anchors(&file),
        Command::Fmt { file, check } => session.fmt(&file, check),
        Command::Check { file } => session.check(&file),
        Command::Html { file } => session.html(&file),
        Command::Fold { file, anchor } => session.fold(&file, &anchor),
    };
    process::exit(code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

struct Session {
    config: Config,
    color_choice: ColorChoice,
}

/// Whether a command needs the configured fold store.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StoreUse {
    None,
    Optional,
    Required,
}

impl Session {
    fn anchors(&self, file: &Path) -> i32 {
        let Some((editor, _)) = self.open(file, StoreUse::None) else {
            return 1;
        };
        match compute_anchors(editor.doc()) {
            Ok(anchors) => {
                for anchor in anchors {
                    println!("{} {} {}", anchor.pos, anchor.level, anchor.id);
                }
                0
            }
            Err(err) => {
                eprintln!("error: {}", err);
                1
            }
        }
    }

    fn fmt(&self, file: &Path, check: bool) -> i32 {
        let Some((editor, source)) = self.open(file, StoreUse::None) else {
            return 1;
        };
        let formatted = format!("{}\n", editor.to_markup());
        if !check {
            print!("{}", formatted);
            return 0;
        }
        if formatted == source {
            0
        } else {
            eprintln!("{}: not formatted", file.display());
            1
        }
    }

    fn check(&self, file: &Path) -> i32 {
        if self.open(file, StoreUse::None).is_none() {
            return 1;
        }
        eprintln!("ok: {} parsed successfully", file.display());
        0
    }

    fn html(&self, file: &Path) -> i32 {
        let Some((editor, _)) = self.open(file, StoreUse::Optional) else {
            return 1;
        };
        println!("{}", editor.render_html());
        0
    }

    fn fold(&self, file: &Path, anchor: &str) -> i32 {
        let Some((mut editor, _)) = self.open(file, StoreUse::Required) else {
            return 1;
        };
        let Some(pos) = editor.anchor_position(anchor) else {
            eprintln!("error: no heading with anchor '{}'", anchor);
            return 1;
        };
        if !editor.toggle_fold(pos) {
            eprintln!("error: '{}' is not a heading", anchor);
            return 1;
        }
        let folded = editor.doc().node_at(pos).is_some_and(Heading::is_collapsed);
        println!("{} {}", if folded { "folded" } else { "unfolded" }, anchor);
        0
    }

    /// Read and parse `file`. Failures are reported before returning `None`.
    fn open(&self, file: &Path, store: StoreUse) -> Option<(Editor, String)> {
        let name = file.display().to_string();
        let source = match fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", name, e);
                return None;
            }
        };

        let collapse = self.collapse_store(file, store)?;

        let mut files = SimpleFiles::new();
        let file_id = files.add(name, source.clone());
        let extensions = Extensions::with_heading(self.config.heading());
        match Editor::from_markup(extensions, &source, file_id, collapse) {
            Ok(editor) => Some((editor.with_dictionary(self.config.dictionary.clone()), source)),
            Err(EditorError::Parse(errors)) => {
                let writer = StandardStream::stderr(self.color_choice);
                let config = term::Config::default();
                for error in &errors {
                    let diagnostic = error.to_diagnostic();
                    let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
                }
                None
            }
            Err(err) => {
                eprintln!("error: {}", err);
                None
            }
        }
    }

    fn collapse_store(&self, file: &Path, store: StoreUse) -> Option<CollapseStore> {
        let document_id = self.config.document_id_for(file);
        let path = match (&self.config.store, store) {
            (_, StoreUse::None) => return Some(CollapseStore::detached(document_id)),
            (Some(path), _) => path,
            (None, StoreUse::Optional) => return Some(CollapseStore::detached(document_id)),
            (None, StoreUse::Required) => {
                eprintln!("error: no fold store configured (set `store` in the config file)");
                return None;
            }
        };
        match JsonFileStore::open(path) {
            Ok(backend) => Some(CollapseStore::new(document_id, Box::new(backend))),
            Err(err) if store == StoreUse::Optional => {
                tracing::warn!(path = %path.display(), error = %err, "fold store unavailable");
                Some(CollapseStore::detached(document_id))
            }
            Err(err) => {
                eprintln!("error: cannot open fold store '{}': {}", path.display(), err);
                None
            }
        }
    }
}
