use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "notefeed")]
#[command(about = "Browse, like and write notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name holding the API configuration and session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Override the profile's API base URL for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in, register or sign out
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List the public feed
    Feed(ListArgs),
    /// List your own notes
    #[command(alias = "my")]
    Mine(ListArgs),
    /// List your favorite notes
    Favorites(ListArgs),
    /// Show a single note
    Show {
        /// Note ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Like or unlike a note
    Like {
        /// Note ID
        id: String,
    },
    /// Favorite or unfavorite a note
    Favorite {
        /// Note ID
        id: String,
    },
    /// List the comments on a note
    Comments {
        /// Note ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Comment on a note
    Comment {
        /// Note ID
        id: String,
        /// Comment text (read from stdin when omitted)
        text: Vec<String>,
    },
    /// Create a new note
    #[command(alias = "new")]
    Create(NoteArgs),
    /// Update an existing note
    #[command(alias = "edit")]
    Update {
        /// Note ID
        id: String,
        #[command(flatten)]
        note: UpdateArgs,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ListArgs {
    /// Zero-based page number
    #[arg(short, long, default_value = "0")]
    pub page: u32,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fields shared by note creation and editing.
#[derive(Args, Debug, Clone)]
pub struct NoteFields {
    /// Note title
    #[arg(long)]
    pub title: String,
    /// Note body (read from stdin when omitted)
    #[arg(long)]
    pub content: Option<String>,
    /// Optional file to attach
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct NoteArgs {
    #[command(flatten)]
    pub fields: NoteFields,
    /// Make the note visible in the public feed
    #[arg(long)]
    pub public: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub fields: NoteFields,
    /// Make the note public (current visibility is kept without a flag)
    #[arg(long, conflicts_with = "private")]
    pub public: bool,
    /// Make the note private
    #[arg(long)]
    pub private: bool,
}

impl UpdateArgs {
    /// Requested visibility, or `None` to keep the note's current one.
    pub const fn visibility(&self) -> Option<bool> {
        if self.public {
            Some(true)
        } else if self.private {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// API base URL, e.g. <https://notes.example.com/api>
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Notes per listing page
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved configuration for a profile
    Show {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login and store the session in the keychain
    Login {
        /// Account username
        #[arg(long, value_name = "USERNAME")]
        username: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and sign in with it
    Register {
        /// Account username
        #[arg(long, value_name = "USERNAME")]
        username: String,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Display name
        #[arg(long, value_name = "NAME")]
        name: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
        /// Optional profile picture to upload after registering
        #[arg(long, value_name = "PATH")]
        picture: Option<PathBuf>,
    },
    /// Show auth status for profile
    Status,
    /// Logout profile and clear stored session
    Logout,
}
