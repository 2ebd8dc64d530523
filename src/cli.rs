//! Command-line arguments for the `vsts-wiql` binary.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::config::Config;
use crate::logging::{LogFormat, LogLevel};
use crate::output::OutputFormat;
use crate::parsed_property::ParsedProperty;

/// Connection settings shared by all commands.
#[derive(ClapArgs, Clone, Default, Debug)]
pub struct ConnectionArgs {
    /// Instance (organization) name, as in https://{instance}.visualstudio.com
    #[arg(short, long, global = true, help_heading = "Connection")]
    pub instance: Option<String>,

    /// Personal Access Token for API authentication
    #[arg(short = 't', long, global = true, help_heading = "Connection")]
    pub pat: Option<String>,

    /// Explicit service URL (e.g. https://dev.azure.com/my-org)
    #[arg(long, global = true, help_heading = "Connection")]
    pub base_url: Option<String>,

    /// Overall request timeout in seconds [default: 30]
    #[arg(long, global = true, help_heading = "Connection")]
    pub timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    /// Converts the flags into a `Config` whose values are tagged as CLI sourced.
    pub fn to_config(&self) -> Config {
        Config {
            instance: self
                .instance
                .as_ref()
                .map(|v| ParsedProperty::Cli(v.clone(), v.clone())),
            pat: self
                .pat
                .as_ref()
                .map(|v| ParsedProperty::Cli(v.clone(), v.clone())),
            base_url: self
                .base_url
                .as_ref()
                .map(|v| ParsedProperty::Cli(v.clone(), v.clone())),
            request_timeout_secs: self
                .timeout_secs
                .map(|v| ParsedProperty::Cli(v, v.to_string())),
        }
    }
}

/// Logging flags. They are read before clap runs; declaring them here keeps
/// clap from rejecting them and documents them in `--help`.
#[derive(ClapArgs, Clone, Default, Debug)]
pub struct LogArgs {
    /// Enable logging at this level
    #[arg(long, global = true, value_enum, help_heading = "Logging")]
    pub log_level: Option<LogLevel>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, help_heading = "Logging")]
    pub log_file: Option<String>,

    /// Log format
    #[arg(long, global = true, value_enum, help_heading = "Logging")]
    pub log_format: Option<LogFormat>,
}

/// Shape to decode a stored query result into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    /// Whatever shape the stored query was authored as.
    #[default]
    Auto,
    /// Flat list of work items.
    Flat,
    /// Tree of work item links.
    Hierarchical,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run an ad-hoc WIQL query
    Query {
        /// WIQL query text
        text: String,

        /// Request a tree of work item links instead of a flat list
        #[arg(long)]
        hierarchical: bool,
    },

    /// Run a stored query by id
    Stored {
        /// Stored query id (UUID)
        id: Uuid,

        /// Result shape to request
        #[arg(long, value_enum, default_value_t = ShapeArg::Auto)]
        shape: ShapeArg,
    },

    /// Show the resolved configuration and where each value came from
    Config,
}

#[derive(Parser, Clone, Debug)]
#[command(
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"),
    about = "Run WIQL work item queries against VSTS / Azure DevOps",
    long_about = "Run WIQL work item queries against VSTS / Azure DevOps.\n\n\
        Configuration can be provided via CLI arguments, environment variables (VSTS_*),\n\
        or the config file (~/.config/vsts-wiql/config.toml).",
    after_help = "EXAMPLES:\n    \
        # Ad-hoc flat query\n    \
        vsts-wiql -i myorg -t <PAT> query \"SELECT [System.Id] FROM WorkItems\"\n\n    \
        # Tree query as JSON\n    \
        vsts-wiql query --hierarchical --output json \"SELECT [System.Id] FROM WorkItemLinks\"\n\n    \
        # Stored query\n    \
        vsts-wiql stored 6f1b3c0e-9d2a-4b8e-a1c3-0123456789ab\n\n    \
        # Create sample config file\n    \
        vsts-wiql --create-config"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub logging: LogArgs,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text, help_heading = "Output")]
    pub output: OutputFormat,

    /// Create a sample configuration file at ~/.config/vsts-wiql/config.toml
    #[arg(long)]
    pub create_config: bool,
}

impl Args {
    /// Layers the config file, environment and CLI flags (lowest to highest).
    pub fn merged_config(&self, file_config: Config) -> Config {
        file_config
            .merge(Config::load_from_env())
            .merge(self.connection.to_config())
    }
}
