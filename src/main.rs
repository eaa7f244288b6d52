// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr) and load settings
// 3. Build the shared pieces: credential holder, API client
// 4. Dispatch to the subcommand handler
// 5. Exit with proper code (0 = success, 1 = operation failed, 2 = error)
//
// Operation failures (a listing the server refused, a download that failed)
// are printed and turned into exit code 1. Only unexpected errors such as a
// broken config file bubble up as code 2.
// =============================================================================

mod api;
mod auth;
mod browse;
mod cli;
mod config;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use auth::{Credential, CredentialHolder, FileCredentialStore};
use browse::{
    ArchiveDownloader, BlobRegistry, ContentPreviewResolver, DirectoryLister, FileDownloader,
    PreviewSlot, RepoView,
};
use cli::{Cli, Commands, RepoArgs};
use config::Settings;

// Everything runs on one thread; network I/O is the only place we wait
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?.with_env(|key| std::env::var(key).ok());
    if let Some(server) = &cli.server {
        settings.base_url = server.clone();
    }
    debug!(?settings, "loaded settings");

    let persistent = matches!(cli.command, Commands::Login { .. } | Commands::Logout);
    let credentials = credential_holder(cli.api_key.as_deref(), settings.credential_path(), persistent)?;

    let client = ApiClient::new(&settings.base_url, credentials.clone())
        .with_context(|| format!("cannot use server {}", settings.base_url))?;

    if !credentials.is_set() && !matches!(cli.command, Commands::Login { .. } | Commands::Logout) {
        warn!("no API key set; run `repo-browser login <key>` or pass --api-key");
    }

    match cli.command {
        Commands::Login { api_key } => handle_login(&client, &credentials, api_key).await,
        Commands::Logout => {
            credentials.clear()?;
            println!("Logged out");
            Ok(0)
        }
        Commands::Repos { json } => handle_repos(&client, json).await,
        Commands::Ls { target, dir, json } => handle_ls(&client, &target, &dir, json).await,
        Commands::Preview {
            target,
            path,
            save,
            json,
        } => handle_preview(&client, &target, &path, save, json).await,
        Commands::Browse { target, dir, json } => {
            handle_browse(&client, &settings, &target, &dir, json).await
        }
        Commands::Download { target, path, out } => {
            let dest = out.unwrap_or_else(|| settings.download_dir.clone());
            handle_download(&client, &target, &path, dest).await
        }
        Commands::Archive { target, full, out } => {
            let dest = out.unwrap_or_else(|| settings.download_dir.clone());
            handle_archive(&client, &target, !full, dest).await
        }
        Commands::Url { target, path } => handle_url(&client, &target, &path).await,
    }
}

// login/logout always go through the credential file. Other commands use
// --api-key for this run only when it is given.
fn credential_holder(api_key: Option<&str>, store_path: PathBuf, persistent: bool) -> Result<CredentialHolder> {
    match api_key {
        Some(key) if !persistent => Ok(CredentialHolder::ephemeral(Some(Credential::new(key)))),
        _ => {
            let store = FileCredentialStore::new(store_path);
            Ok(CredentialHolder::load(Arc::new(store))?)
        }
    }
}

// RUST_LOG wins; otherwise -v picks the level. Logs go to stderr.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repo_browser={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn handle_login(client: &ApiClient, credentials: &CredentialHolder, api_key: String) -> Result<i32> {
    let credential = Credential::new(api_key);

    if let Err(e) = client.login(&credential).await {
        eprintln!("Login failed: {e}");
        return Ok(1);
    }

    credentials.set(credential)?;
    info!(server = %client.base_url(), "logged in");
    println!("Logged in to {}", client.base_url());
    Ok(0)
}

async fn handle_repos(client: &ApiClient, json: bool) -> Result<i32> {
    match client.list_repos().await {
        Ok(repos) => {
            render::print_repos(&repos, json)?;
            Ok(0)
        }
        Err(e) => {
            eprintln!("Failed to list repositories: {e}");
            Ok(1)
        }
    }
}

async fn handle_ls(client: &ApiClient, target: &RepoArgs, dir: &str, json: bool) -> Result<i32> {
    let lister = DirectoryLister::new(client.clone());

    match lister.list(&target.repo, &target.branch, dir).await {
        Ok(entries) => {
            render::print_listing(&entries, json)?;
            Ok(0)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(1)
        }
    }
}

async fn handle_preview(
    client: &ApiClient,
    target: &RepoArgs,
    path: &str,
    save: Option<PathBuf>,
    json: bool,
) -> Result<i32> {
    let resolver = ContentPreviewResolver::new(client.clone(), BlobRegistry::new());
    let slot = PreviewSlot::new();
    resolver
        .load_into(&slot, &target.repo, &target.branch, path)
        .await;

    let state = slot.take();
    if json {
        render::print_json(&render::PreviewSummary::new(path, state.as_ref()))?;
    } else {
        let hint = render::download_hint(&target.repo, &target.branch, path);
        render::print_preview(path, state.as_ref(), &hint);
    }

    let exit_code = match (&state, &save) {
        (Some(Ok(result)), Some(dest)) => match result.binary() {
            Some(blob) => {
                blob.save_to(dest)
                    .await
                    .with_context(|| format!("could not write {}", dest.display()))?;
                println!("Saved {} bytes to {}", blob.len(), dest.display());
                0
            }
            None => {
                eprintln!("{path} was previewed as text; nothing to save");
                0
            }
        },
        (Some(Ok(_)), None) => 0,
        _ => 1,
    };

    // Dropping the state releases its binary ref
    drop(state);
    let stats = resolver.blobs().stats();
    debug!(allocated = stats.allocated, released = stats.released, live = stats.live, "preview done");
    Ok(exit_code)
}

async fn handle_browse(
    client: &ApiClient,
    settings: &Settings,
    target: &RepoArgs,
    dir: &str,
    json: bool,
) -> Result<i32> {
    let resolver = ContentPreviewResolver::new(client.clone(), BlobRegistry::new());
    let mut view = RepoView::new(
        DirectoryLister::new(client.clone()),
        resolver,
        target.repo.clone(),
        target.branch.clone(),
        settings.preview_concurrency,
    );

    view.open(dir).await;
    render::print_view(&view, json)?;

    let failed = view.failed_previews();
    if failed > 0 {
        eprintln!("{failed} preview(s) failed");
    }
    let exit_code = if view.listing_error().is_some() || failed > 0 { 1 } else { 0 };
    view.close();
    let stats = view.resolver().blobs().stats();
    debug!(allocated = stats.allocated, released = stats.released, live = stats.live, "view closed");
    Ok(exit_code)
}

async fn handle_download(client: &ApiClient, target: &RepoArgs, path: &str, dest: PathBuf) -> Result<i32> {
    let downloader = FileDownloader::new(client.clone(), dest);

    match downloader.download_file(&target.repo, &target.branch, path).await {
        Ok(saved) => {
            println!("Saved {}", saved.display());
            Ok(0)
        }
        Err(e) => {
            eprintln!("Failed to download {path}: {e}");
            Ok(1)
        }
    }
}

async fn handle_archive(client: &ApiClient, target: &RepoArgs, shallow: bool, dest: PathBuf) -> Result<i32> {
    let downloader = ArchiveDownloader::new(client.clone(), dest);

    match downloader
        .download_archive(&target.repo, &target.branch, shallow)
        .await
    {
        Ok(saved) => {
            println!("Saved {}", saved.display());
            Ok(0)
        }
        Err(e) => {
            eprintln!("Failed to download repository {}: {e}", target.repo);
            Ok(1)
        }
    }
}

async fn handle_url(client: &ApiClient, target: &RepoArgs, path: &str) -> Result<i32> {
    match client.file_info(&target.repo, &target.branch, path).await {
        Ok(info) => {
            println!("{}", info.file_url);
            Ok(0)
        }
        Err(e) => {
            eprintln!("Failed to get URL for {path}: {e}");
            Ok(1)
        }
    }
}
