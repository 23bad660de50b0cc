use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use gramvaultapp::model::{DaiStatus, Theme};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gramvault",
    bin_name = "gramvault",
    version,
    about = "Jewellery inventory, billing and DAI tracking ledger",
    long_about = None,
    after_help = "Ids can be shortened to any prefix that matches a single record."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the data files
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to gramvault.toml in the OS config directory)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true, help_heading = "Options")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inventory entries of the current user
    #[command(alias = "e", display_order = 1)]
    Entry {
        #[command(subcommand)]
        action: EntryCommands,
    },

    /// Total weight of the current user's entries
    #[command(display_order = 2)]
    Total,

    /// Billing estimate for the current user
    #[command(display_order = 3)]
    Bill,

    /// Show or set the current user's billing rate per gram
    #[command(display_order = 4)]
    Rate {
        /// New rate; omit to show the current one
        value: Option<f64>,
    },

    /// User profiles
    #[command(alias = "u", display_order = 5)]
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// DAI dispatch records
    #[command(display_order = 6)]
    Dai {
        #[command(subcommand)]
        action: DaiCommands,
    },

    /// Recycle bin (lists its contents when no action is given)
    #[command(display_order = 7)]
    Trash {
        #[command(subcommand)]
        action: Option<TrashCommands>,
    },

    /// Notebook notes
    #[command(display_order = 8)]
    Note {
        #[command(subcommand)]
        action: NoteCommands,
    },

    /// Emergency contacts
    #[command(display_order = 9)]
    Contact {
        #[command(subcommand)]
        action: ContactCommands,
    },

    /// DAI images
    #[command(display_order = 10)]
    Image {
        #[command(subcommand)]
        action: ImageCommands,
    },

    /// Export or import a full backup
    #[command(display_order = 11)]
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },

    /// Display titles
    #[command(display_order = 12)]
    Settings {
        #[command(subcommand)]
        action: Option<SettingsCommands>,
    },

    /// Show or set the theme
    #[command(display_order = 13)]
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntryCommands {
    /// Record a new entry
    #[command(alias = "a")]
    Add {
        /// Invoice number (e.g. INV-12)
        invoice: String,

        /// Weight in grams
        weight: f64,

        /// Description words
        #[arg(trailing_var_arg = true)]
        description: Vec<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        quantity: Option<f64>,

        /// Date as written on the invoice
        #[arg(long)]
        date: Option<String>,
    },

    /// List entries in invoice order
    #[command(alias = "ls")]
    List {
        /// Only entries in the recycle bin
        #[arg(long, conflicts_with = "all")]
        deleted: bool,

        /// Live and deleted entries
        #[arg(long)]
        all: bool,
    },

    /// Change fields of an entry
    Edit {
        id: String,

        #[arg(long)]
        invoice: Option<String>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        quantity: Option<f64>,

        #[arg(long)]
        date: Option<String>,
    },

    /// Move entries to the recycle bin
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Bring entries back from the recycle bin
    Restore {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Permanently remove entries that are in the recycle bin
    Purge {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user and switch to it
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// List active users
    #[command(alias = "ls")]
    List,

    /// Switch the current user
    Select { id: String },

    /// Update profile fields
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Photo as an opaque string (e.g. a data URL)
        #[arg(long)]
        photo: Option<String>,
    },

    /// Move users to the recycle bin
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Bring users back from the recycle bin
    Restore {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Permanently remove users that are in the recycle bin
    Purge {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DaiCommands {
    /// Record a new DAI number, status waiting
    Add {
        di_number: String,

        /// Defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(trailing_var_arg = true)]
        details: Vec<String>,
    },

    /// List DAI records outside the trash
    #[command(alias = "ls")]
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Mark records as out
    Out {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Mark records as in
    In {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Mark records as waiting
    Wait {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Change fields of a record
    Edit {
        id: String,

        #[arg(long = "di")]
        di_number: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        details: Option<String>,
    },

    /// Move records to the recycle bin
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Bring records back from the recycle bin (as waiting)
    Restore {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Permanently remove records that are in the recycle bin
    Purge {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TrashCommands {
    /// List everything in the recycle bin
    #[command(alias = "ls")]
    List,

    /// Permanently delete everything in the recycle bin
    Empty {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    #[command(alias = "ls")]
    List,
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    Add { name: String, number: String },
    #[command(alias = "ls")]
    List,
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    Add {
        /// Image as an opaque string (e.g. a data URL)
        url: String,

        #[arg(trailing_var_arg = true)]
        title: Vec<String>,
    },
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Write a full backup file
    Export {
        /// File or directory (defaults to the configured backup directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Merge a backup file into the current data
    Import {
        file: PathBuf,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show titles, theme and current user
    Show,

    /// Change the display titles
    Titles {
        #[arg(long)]
        primary: Option<String>,

        #[arg(long)]
        secondary: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum StatusArg {
    Waiting,
    Out,
    In,
    Trash,
}

impl From<StatusArg> for DaiStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Waiting => DaiStatus::Waiting,
            StatusArg::Out => DaiStatus::Out,
            StatusArg::In => DaiStatus::In,
            StatusArg::Trash => DaiStatus::Trash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_entry_add_with_description_words() {
        let cli = Cli::parse_from(["gramvault", "entry", "add", "INV-3", "2.5", "gold", "ring"]);
        match cli.command {
            Some(Commands::Entry {
                action:
                    EntryCommands::Add {
                        invoice,
                        weight,
                        description,
                        ..
                    },
            }) => {
                assert_eq!(invoice, "INV-3");
                assert_eq!(weight, 2.5);
                assert_eq!(description, vec!["gold", "ring"]);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["gramvault", "total", "--data-dir", "/tmp/x", "-vv"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn trash_without_action_is_allowed() {
        let cli = Cli::parse_from(["gramvault", "trash"]);
        assert!(matches!(cli.command, Some(Commands::Trash { action: None })));
    }
}
