//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::Field;

/// Functional model manager: element trees, compiler-instruction overrides and packed notes
#[derive(Parser, Debug)]
#[command(name = "fmodel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model store file (default: store_path setting)
    #[arg(short, long, global = true, env = "FMODEL_STORE", value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Project directory searched for .fmodel.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a scope as tree
    Tree {
        /// Scope element id (default: default_scope setting or last root)
        scope: Option<String>,
        /// Show element ids
        #[arg(long)]
        ids: bool,
    },

    /// Show all fields of a catalog element
    Show {
        /// Element id
        id: String,
    },

    /// Print one field of a catalog element
    Get {
        /// Element id
        id: String,
        /// Field name, e.g. overview, statement, row, criterion-id
        field: Field,
    },

    /// Write one field of a catalog element and save the store
    Set {
        /// Element id
        id: String,
        /// Field name, e.g. overview, statement, row, criterion-id
        field: Field,
        /// New value (Y/N for flags)
        value: String,
    },

    /// Export a scope to an interchange file
    Export {
        /// Scope element id
        scope: Option<String>,
        /// Output file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Import an interchange file below a scope and save the store
    Import {
        /// Interchange file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Target scope element id
        #[arg(long)]
        into: String,
    },

    /// Export, re-import into a scratch scope and compare
    Roundtrip {
        /// Scope element id
        scope: Option<String>,
        /// Keep both export files in this directory (default: temp dir removed afterwards)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Pack or unpack $XX$ note fields
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotesCommands {
    /// Pack KEY=VALUE pairs into one note, in argument order
    Pack {
        /// Fields as KEY=VALUE, KEY is two uppercase letters
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Unpack a note into its fields
    Unpack {
        /// Packed note text
        text: String,
        /// Maximum number of tags honored (default: note_tag_cap setting)
        #[arg(long)]
        cap: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a template config file
    Template,
}
