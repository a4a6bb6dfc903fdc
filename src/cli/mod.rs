//! CLI argument definitions for nomad-conf.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("NC_GIT_COMMIT"),
    "\nbuilt: ",
    env!("NC_BUILD_TIMESTAMP"),
);

/// nomad-conf - Read, write, copy and diff Nomad variables.
///
/// Variables are addressed as `<path>` (the whole variable) or
/// `<path>:<key>` (a single key).
#[derive(Parser, Debug)]
#[command(name = "nomad-conf")]
#[command(author, version, long_version = LONG_VERSION, about = "Manage Nomad variables", long_about = None)]
pub struct Cli {
    /// Nomad API address, or file://<dir> for a local store [env: NOMAD_ADDR]
    #[arg(long, global = true)]
    pub nomad_server: Option<String>,

    /// Nomad namespace [env: NOMAD_NAMESPACE]
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Send check-and-set indexes with updates [config: check-index]
    #[arg(long, global = true)]
    pub check_index: bool,

    /// Report failed reads instead of treating them as missing [config: strict-not-found]
    #[arg(long, global = true)]
    pub strict_not_found: bool,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and write variables
    Var {
        #[command(subcommand)]
        command: VarCommands,
    },

    /// Copy a variable or a key onto another path
    ///
    /// Both sides must be whole variables, or both must name a key.
    Cp {
        /// Source (<path> or <path>:<key>)
        from: String,

        /// Destination (<path> or <path>:<key>)
        to: String,

        /// Fail instead of creating a missing destination
        #[arg(long)]
        no_create: bool,
    },

    /// Show the difference between a stored key and a local file
    Diff {
        /// Local file with the candidate content
        file: PathBuf,

        /// Variable key to compare against (<path>:<key>)
        spec: String,
    },

    /// Upload a local file into an existing key
    Upload {
        /// Local file to upload
        file: PathBuf,

        /// Variable key to write (<path>:<key>)
        spec: String,

        /// Skip the upload when the content is unchanged
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        require_changes: bool,
    },

    /// Export a Let's Encrypt certificate to a variable
    Cert {
        /// Certificate name (a directory under <letsencrypt-base>/live)
        name: String,

        /// certbot configuration directory
        #[arg(long, default_value = crate::cert::DEFAULT_LETSENCRYPT_BASE)]
        letsencrypt_base: PathBuf,

        /// Prefix for the variable path
        #[arg(long, default_value = crate::cert::DEFAULT_VAR_BASE)]
        var_base: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Variable subcommands
#[derive(Subcommand, Debug)]
pub enum VarCommands {
    /// Print a variable or key; with no argument, list all variable paths
    Get {
        /// Variable (<path>) or key (<path>:<key>)
        spec: Option<String>,
    },

    /// Overwrite an existing key with the contents of stdin
    Put {
        /// Variable key (<path>:<key>)
        spec: String,
    },

    /// Create a variable holding one key from stdin, replacing any existing one
    Create {
        /// Variable key (<path>:<key>)
        spec: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each value came from
    Show,
}
