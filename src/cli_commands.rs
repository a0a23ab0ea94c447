use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Configure or show the directory authority
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },

    /// Fetch and print the whole directory
    Snapshot {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect and edit groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Inspect and edit a member's group memberships
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
pub(crate) enum RemoteCommands {
    /// Show the configured remote
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the configured remote
    Set {
        #[arg(long)]
        url: String,
        /// Bearer token (ROSTER_TOKEN overrides it at runtime)
        #[arg(long)]
        token: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Subcommand)]
pub(crate) enum GroupCommands {
    /// List groups
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a group and its members
    Show {
        /// Group id or name (a leading '#' is ignored)
        group: String,
        #[arg(long)]
        json: bool,
    },
    /// Replace a group's membership with the edited member set
    Sync {
        group: String,
        #[command(flatten)]
        edit: CheckEdit,
        #[arg(long)]
        json: bool,
    },
    /// Create a group
    Create {
        name: String,
        #[arg(long)]
        private: bool,
        #[arg(long)]
        json: bool,
    },
    /// Archive a group
    Archive {
        group: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum MemberCommands {
    /// List members
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a member and the groups they belong to
    Show {
        /// Member id or display name
        member: String,
        #[arg(long)]
        json: bool,
    },
    /// Bring the member's group memberships in line with the edited group set
    Sync {
        member: String,
        #[command(flatten)]
        edit: CheckEdit,
        #[arg(long)]
        json: bool,
    },
    /// Add a person to the directory (development authority only)
    Register {
        id: String,
        name: String,
    },
}

/// Checkbox edits applied to the focused entity's current memberships.
///
/// Applied in order: `--set` or `--all`/`--none` first, then `--add`, then
/// `--remove`. Values are ids or names.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct CheckEdit {
    /// Replace the checks with exactly these entries
    #[arg(long, value_delimiter = ',')]
    pub(crate) set: Option<Vec<String>>,

    /// Check these entries
    #[arg(long, value_delimiter = ',')]
    pub(crate) add: Vec<String>,

    /// Uncheck these entries
    #[arg(long, value_delimiter = ',')]
    pub(crate) remove: Vec<String>,

    /// Check everything (select-all)
    #[arg(long, conflicts_with_all = ["none", "set"])]
    pub(crate) all: bool,

    /// Uncheck everything
    #[arg(long, conflicts_with = "set")]
    pub(crate) none: bool,

    /// Print the plan without calling the authority
    #[arg(long)]
    pub(crate) dry_run: bool,
}
