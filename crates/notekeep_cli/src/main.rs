//! Command-line presentation for the note store.
//!
//! # Responsibility
//! - Map user actions 1:1 onto core store and transfer operations.
//! - Keep rendering and file-picking concerns out of the core crate.

use clap::{Parser, Subcommand};
use notekeep_core::{
    content_type_for_path, default_log_level, init_logging, Note, NoteId, NoteStore,
    SqliteBackend, TransferService,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Notekeep - local notes with XML import/export
#[derive(Parser, Debug)]
#[command(name = "notekeep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file holding the note collection
    #[arg(long, global = true, default_value = "notekeep.sqlite3")]
    db: PathBuf,

    /// Directory for rotating log files; file logging is off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all notes, most recently updated first
    List,

    /// Show one note in full
    Show {
        /// Note id as printed by `list`
        id: NoteId,
    },

    /// Add a new note
    Add {
        /// Title; a placeholder is used when omitted
        #[arg(long)]
        title: Option<String>,

        /// Body; a placeholder is used when omitted
        #[arg(long)]
        body: Option<String>,
    },

    /// Edit an existing note
    Edit {
        id: NoteId,

        /// New title; kept as-is when omitted
        #[arg(long)]
        title: Option<String>,

        /// New body; kept as-is when omitted
        #[arg(long)]
        body: Option<String>,
    },

    /// Delete a note
    Delete {
        id: NoteId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Export all notes as an XML document
    Export {
        /// Output file or directory; defaults to ./notes.xml
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import notes from an XML file
    Import {
        /// File to import; must carry an XML content type
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        if let Err(message) = init_file_logging(log_dir) {
            eprintln!("warning: {message}");
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_file_logging(log_dir: &Path) -> Result<(), String> {
    let absolute = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| format!("cannot resolve current directory: {err}"))?
            .join(log_dir)
    };
    let dir = absolute
        .to_str()
        .ok_or_else(|| "log directory path is not valid UTF-8".to_string())?;
    init_logging(default_log_level(), dir)
}

fn run(cli: &Cli) -> Result<(), String> {
    let backend = SqliteBackend::open(&cli.db).map_err(|err| err.to_string())?;
    let store = NoteStore::new(backend);

    match &cli.command {
        Commands::List => {
            let notes = store.list();
            if notes.is_empty() {
                println!("no notes yet");
                return Ok(());
            }
            for note in notes {
                println!("{:>7}  {}  {}", note.id, note.updated, note.title);
                let preview = note.preview();
                if !preview.is_empty() {
                    println!("         {preview}");
                }
            }
            Ok(())
        }
        Commands::Show { id } => {
            let note = find_note(&store, *id)?;
            println!("id:      {}", note.id);
            println!("updated: {}", note.updated);
            println!("title:   {}", note.title);
            println!();
            println!("{}", note.body);
            Ok(())
        }
        Commands::Add { title, body } => {
            let mut draft = Note::draft();
            if let Some(title) = title {
                draft.title = title.clone();
            }
            if let Some(body) = body {
                draft.body = body.clone();
            }
            let stored = store.upsert(draft).map_err(|err| err.to_string())?;
            println!("added note {}", stored.id);
            Ok(())
        }
        Commands::Edit { id, title, body } => {
            let current = find_note(&store, *id)?;
            let stored = store
                .upsert(Note {
                    id: current.id,
                    title: title.clone().unwrap_or(current.title),
                    body: body.clone().unwrap_or(current.body),
                    updated: String::new(),
                })
                .map_err(|err| err.to_string())?;
            println!("updated note {}", stored.id);
            Ok(())
        }
        Commands::Delete { id, yes } => {
            if !*yes && !confirm_delete(*id)? {
                println!("cancelled");
                return Ok(());
            }
            store.delete_by_id(*id).map_err(|err| err.to_string())?;
            println!("deleted note {id}");
            Ok(())
        }
        Commands::Export { out } => {
            let service = TransferService::new(&store);
            let document = match service.export_document().map_err(|err| err.to_string())? {
                Some(document) => document,
                None => {
                    println!("nothing to export");
                    return Ok(());
                }
            };
            let out_path = resolve_export_path(out.as_deref(), document.file_name);
            std::fs::write(&out_path, &document.contents)
                .map_err(|err| format!("cannot write `{}`: {err}", out_path.display()))?;
            println!("exported {} to {}", document.file_name, out_path.display());
            Ok(())
        }
        Commands::Import { file } => {
            let content_type = content_type_for_path(file);
            let xml = std::fs::read_to_string(file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let service = TransferService::new(&store);
            let report = service
                .import_document(content_type, &xml)
                .map_err(|err| err.to_string())?;
            println!("imported {} notes ({} new)", report.decoded, report.added);
            Ok(())
        }
    }
}

fn find_note(store: &NoteStore<SqliteBackend>, id: NoteId) -> Result<Note, String> {
    store
        .list()
        .into_iter()
        .find(|note| note.id == id)
        .ok_or_else(|| format!("no note with id {id}"))
}

fn confirm_delete(id: NoteId) -> Result<bool, String> {
    print!("delete note {id}? [y/N] ");
    std::io::stdout().flush().map_err(|err| err.to_string())?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|err| err.to_string())?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn resolve_export_path(out: Option<&Path>, file_name: &str) -> PathBuf {
    match out {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}
