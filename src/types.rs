//! Shared types for the agenda application: the crate-wide `Result` alias
//! and the CLI command surface.
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::{AgendaError, Repeat};

/// A specialized Result type for agenda operations.
pub type Result<T> = std::result::Result<T, AgendaError>;

/// Recurrence choice on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RepeatArg {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<RepeatArg> for Repeat {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Daily => Repeat::Daily,
            RepeatArg::Weekly => Repeat::Weekly,
            RepeatArg::Monthly => Repeat::Monthly,
            RepeatArg::Yearly => Repeat::Yearly,
        }
    }
}

/// Available subcommands for the agenda application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    Create {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the note, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Tags to associate with the note (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Path to a file containing the note's content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Checklist item to attach (repeatable)
        #[clap(long = "todo")]
        todos: Vec<String>,

        /// Reminder date/time (e.g. 2024-05-01T09:00 or 2024-05-01)
        #[clap(short, long)]
        remind: Option<String>,

        /// Recurrence for the reminder
        #[clap(long, value_enum)]
        repeat: Option<RepeatArg>,
    },

    /// View a note by ID
    View {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List notes with optional filtering
    List {
        /// Filter notes by tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Filter notes by a search term
        #[clap(short, long)]
        search: Option<String>,

        /// Limit the number of notes returned (0 = no limit)
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,

        /// Include archived notes
        #[clap(short, long)]
        archived: bool,
    },

    /// Search notes by title or content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results (0 = no limit)
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Path to a file containing the new note content
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Tags to add (comma-separated)
        #[clap(long)]
        add_tags: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(long)]
        remove_tags: Option<String>,

        /// New reminder date/time (e.g. 2024-05-01T09:00)
        #[clap(long)]
        remind: Option<String>,

        /// Recurrence for the reminder
        #[clap(long, value_enum)]
        repeat: Option<RepeatArg>,

        /// Remove the note's reminder
        #[clap(long)]
        clear_reminder: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Manage a note's checklist items
    Todo {
        /// ID of the note
        id: String,

        /// Add a checklist item with this text
        #[clap(short, long)]
        add: Option<String>,

        /// Toggle the completed flag of the item with this ID
        #[clap(short, long)]
        toggle: Option<String>,

        /// Remove the item with this ID
        #[clap(short, long)]
        remove: Option<String>,
    },

    /// Hide a note from default views without deleting it
    Archive {
        /// ID of the note to archive
        id: String,
    },

    /// Return an archived note to the default views
    Unarchive {
        /// ID of the note to unarchive
        id: String,
    },

    /// Tag operations (list, rename, delete)
    Tags {
        /// Rename a tag across all notes
        #[clap(long, num_args = 2, value_names = ["OLD", "NEW"])]
        rename: Option<Vec<String>>,

        /// Delete a tag from all notes
        #[clap(long)]
        delete: Option<String>,
    },

    /// Show the weekly calendar of notes and reminder occurrences
    Calendar {
        /// Show the week containing this date (YYYY-MM-DD, default today)
        date: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show when a note's reminder fires next
    Remind {
        /// ID of the note
        id: String,
    },

    /// Import notes from a JSON export file
    Import {
        /// Path to the JSON file to import
        file: PathBuf,
    },

    /// Export all notes to a JSON file
    Export {
        /// Path for the export file (default: agenda-notes-<date>.json)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}
