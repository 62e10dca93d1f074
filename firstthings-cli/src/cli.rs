use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ftf")]
#[command(about = concat!(
    "+-------------------+-------------------+\n",
    "|  Q1  Do           |  Q2  Schedule     |\n",
    "+-------------------+-------------------+\n",
    "|  Q3  Delegate     |  Q4  Eliminate    |\n",
    "+-------------------+-------------------+\n",
    "~First things first: sort tasks by urgency and importance~"
))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ViewArg {
    Quadrant,
    Category,
    Project,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ThemeArg {
    Dark,
    Light,
    Toggle,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a task
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Mark the task urgent
        #[arg(long, short = 'u')]
        urgent: bool,
        /// Mark the task important
        #[arg(long, short = 'i')]
        important: bool,
        /// Place the task in a quadrant (1-4), overriding -u/-i
        #[arg(long, short = 'q', value_parser = clap::value_parser!(u8).range(1..=4))]
        quadrant: Option<u8>,
        #[arg(long, short = 'n')]
        notes: Option<String>,
        /// Category id or name
        #[arg(long, short = 'C', value_name = "CATEGORY")]
        category: Option<String>,
        /// Project id or name
        #[arg(long, short = 'p', value_name = "PROJECT")]
        project: Option<String>,
        /// Due date ("tomorrow", "friday", "2024-03-15", ...)
        #[arg(long, short = 'd', value_name = "DATE")]
        due: Option<String>,
        #[arg(long, short = 'r')]
        recurring: bool,
    },

    /// Edit a task's fields
    Edit {
        /// Task id (a unique prefix is enough)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short = 'n')]
        notes: Option<String>,
        #[arg(long)]
        urgent: Option<bool>,
        #[arg(long)]
        important: Option<bool>,
        /// New category (use 'none' to clear)
        #[arg(long, short = 'C', value_name = "CATEGORY")]
        category: Option<String>,
        /// New project (use 'none' to clear)
        #[arg(long, short = 'p', value_name = "PROJECT")]
        project: Option<String>,
        /// New due date (use 'none' to clear)
        #[arg(long, short = 'd', value_name = "DATE")]
        due: Option<String>,
        #[arg(long)]
        recurring: Option<bool>,
    },

    /// Toggles task completion status
    Done { id: String },

    /// Removes a task
    Remove {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Move a task to another quadrant
    Move {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        quadrant: u8,
    },

    /// Show the matrix, or tasks grouped by category or project
    Show {
        #[arg(long, short = 'v', value_enum, default_value = "quadrant")]
        view: ViewArg,
        /// Use compact one-line format
        #[arg(long, short = 'c')]
        compact: bool,
        /// Show notes and timestamps
        #[arg(long)]
        detailed: bool,
        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Quadrant labels, colors and theme
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Write all data to a JSON file
    Export {
        /// Defaults to firstthingsfirst-export-YYYY-MM-DD.json
        path: Option<String>,
    },

    /// Replace all data with a previously exported file
    Import {
        path: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Delete every task, category, project and setting
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Restore data from the backup written by the previous save
    Recover {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the config file location and values
    Config,
}

/// Shared by `category` and `project`
#[derive(Subcommand)]
pub enum ListAction {
    /// Create an item
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        #[command(flatten)]
        fields: ListFields,
    },
    /// Change an item's name, color or dates
    Edit {
        /// Id or name
        item: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ListFields,
    },
    /// Delete an item and clear it from its tasks
    Remove {
        item: String,
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Move an item to the position another item occupies
    Move {
        item: String,
        #[arg(long)]
        before: String,
    },
    /// List items in order
    List {
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args)]
pub struct ListFields {
    /// Hex color, e.g. "#AEE7B1" (random when adding without one)
    #[arg(long)]
    pub color: Option<String>,
    /// Start date (use 'none' to clear)
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,
    /// End date (use 'none' to clear)
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print quadrant styles and theme
    Show {
        #[arg(long)]
        no_color: bool,
    },
    /// Change a quadrant's label and/or color
    Set {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        quadrant: u8,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Restore default labels and colors (the theme is kept)
    Reset {
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Set or toggle the theme
    Theme {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_parses_flags() {
        let cli = Cli::try_parse_from(["ftf", "add", "Pay", "rent", "-u", "-i", "-d", "friday"]).unwrap();
        match cli.command {
            Commands::Add {
                title,
                urgent,
                important,
                due,
                ..
            } => {
                assert_eq!(title, ["Pay", "rent"]);
                assert!(urgent && important);
                assert_eq!(due.as_deref(), Some("friday"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_quadrant_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["ftf", "move", "abc", "5"]).is_err());
        assert!(Cli::try_parse_from(["ftf", "move", "abc", "4"]).is_ok());
    }
}
