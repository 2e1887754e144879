//! Asset CLI - inspect and edit asset libraries from the command line.
//!
//! Wraps the asset-system crate: lists configured libraries and their
//! catalogs, edits catalogs and resolves persisted weak references.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "asset-cli")]
#[command(about = "Inspect asset libraries, catalogs and asset references")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Preferences file (defaults to the platform config directory)
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,

    /// Path of the open document; decides what the local library is
    #[arg(long, global = true)]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List libraries that can currently be loaded
    Libraries,

    /// Register a custom library in the preferences
    AddLibrary {
        name: String,
        dirpath: PathBuf,
        /// link, append or append_reuse
        #[arg(long, default_value = "append_reuse")]
        import_method: String,
    },

    /// List the catalogs of a library
    Catalogs {
        /// current-file, local, essentials, all or custom:<index>
        library: String,
    },

    /// Create a catalog in the library at a directory and write it to disk
    AddCatalog {
        dirpath: PathBuf,
        /// Catalog path, e.g. "props/chairs"
        path: String,
    },

    /// List the document files of the library at a directory
    Files { dirpath: PathBuf },

    /// Resolve a weak asset reference to a path
    Resolve {
        /// local, essentials or custom
        #[arg(long = "type", default_value = "custom")]
        library_type: String,
        /// Library name, for custom libraries
        #[arg(long)]
        library: Option<String>,
        /// Path relative to the library root
        relative_path: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let preferences_path = match args.preferences {
        Some(path) => path,
        None => asset_system::platform::default_preferences_path()?,
    };
    debug!("Preferences: {}", preferences_path.display());

    let mut session = commands::Session::open(&preferences_path, args.document.as_deref())?;
    let result = match args.command {
        Command::Libraries => session.libraries(),
        Command::AddLibrary {
            name,
            dirpath,
            import_method,
        } => session.add_library(&name, &dirpath, &import_method),
        Command::Catalogs { library } => session.catalogs(&library),
        Command::AddCatalog { dirpath, path } => session.add_catalog(&dirpath, &path),
        Command::Files { dirpath } => session.files(&dirpath),
        Command::Resolve {
            library_type,
            library,
            relative_path,
            json,
        } => session.resolve(&library_type, library, &relative_path, json),
    };
    session.close();
    result
}
