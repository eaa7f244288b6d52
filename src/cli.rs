// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described with Rust structs
// and attributes, and clap generates the parsing, --help and --version.
//
// Global flags (--server, --config, --api-key, -v) work before or after the
// subcommand.
// =============================================================================

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::RepoRef;

#[derive(Parser, Debug)]
#[command(
    name = "repo-browser",
    version,
    about = "Browse, preview and download files from a remote repository hub",
    long_about = "repo-browser lists the repositories you can access on a hub, walks their \
                  directory trees at any branch, previews files inline (text, markdown, \
                  images, video) and downloads single files or whole repositories."
)]
pub struct Cli {
    /// Base URL of the hub (overrides the config file)
    #[arg(long, global = true, env = "REPO_BROWSER_URL")]
    pub server: Option<String>,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use this API key for this run only (it is not stored)
    #[arg(long, global = true, env = "REPO_BROWSER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

// Options shared by every command that works on one repository at a branch
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository as namespace/name (e.g. ox/CatDogBBox)
    #[arg(value_parser = parse_repo)]
    pub repo: RepoRef,

    /// Branch to read from
    #[arg(long, short, default_value = "main")]
    pub branch: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an API key with the hub and remember it
    Login {
        /// The API key to store
        api_key: String,
    },

    /// Forget the stored API key
    Logout,

    /// List the repositories you can access
    Repos {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List one directory of a repository
    ///
    /// Example: repo-browser ls ox/CatDogBBox --dir images
    Ls {
        #[command(flatten)]
        target: RepoArgs,

        /// Directory to list; empty means the repository root
        #[arg(long, default_value = "")]
        dir: String,

        #[arg(long)]
        json: bool,
    },

    /// Preview a single file
    ///
    /// Example: repo-browser preview ox/CatDogBBox README.md
    Preview {
        #[command(flatten)]
        target: RepoArgs,

        /// Repo-relative path of the file
        path: String,

        /// Save binary content (images, video, other files) to this path
        #[arg(long)]
        save: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Show a directory with inline previews of every file, plus the README
    Browse {
        #[command(flatten)]
        target: RepoArgs,

        #[arg(long, default_value = "")]
        dir: String,

        #[arg(long)]
        json: bool,
    },

    /// Download a single file
    Download {
        #[command(flatten)]
        target: RepoArgs,

        /// Repo-relative path of the file
        path: String,

        /// Directory to save into (defaults to the configured download_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Download the whole repository as a zip archive
    Archive {
        #[command(flatten)]
        target: RepoArgs,

        /// Include full history instead of a shallow snapshot
        #[arg(long)]
        full: bool,

        /// Directory to save into (defaults to the configured download_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a direct hub URL for a file
    Url {
        #[command(flatten)]
        target: RepoArgs,

        /// Repo-relative path of the file
        path: String,
    },
}

fn parse_repo(value: &str) -> Result<RepoRef, String> {
    RepoRef::parse(value).ok_or_else(|| format!("expected namespace/name, got '{value}'"))
}


// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why #[command(flatten)]?
//    - Most commands need the same "which repo, which branch" arguments
//    - RepoArgs declares them once and every subcommand pulls them in
//
// 2. Why value_parser = parse_repo?
//    - "ox/CatDogBBox" is turned into a RepoRef while parsing, so a typo is
//      reported as a usage error before any request is made
//
// 3. Why global = true?
//    - `repo-browser --server X ls ...` and `repo-browser ls ... --server X`
//      both work
// -----------------------------------------------------------------------------
