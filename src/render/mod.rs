// src/render/mod.rs
// =============================================================================
// Everything that prints to stdout.
//
// Each printer has a human-readable form (tables, rendered markdown) and a
// --json form built from serializable report structs. Logs go to stderr, so
// the JSON output can be piped straight into other tools.
// =============================================================================

mod markdown;
mod report;

pub use markdown::render_markdown;
pub use report::PreviewSummary;
use report::ViewReport;

use anyhow::Result;
use serde::Serialize;

use crate::api::{DirEntry, RepoRef};
use crate::browse::{PreviewResult, PreviewState, RepoView};

// Prints `value` as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_repos(repos: &[RepoRef], json: bool) -> Result<()> {
    if json {
        return print_json(repos);
    }

    println!("{:<30} {:<40}", "NAMESPACE", "NAME");
    println!("{}", "=".repeat(70));
    for repo in repos {
        println!("{:<30} {:<40}", repo.namespace(), repo.name());
    }
    Ok(())
}

pub fn print_listing(entries: &[DirEntry], json: bool) -> Result<()> {
    if json {
        return print_json(entries);
    }
    print_entry_table(entries);
    Ok(())
}

fn print_entry_table(entries: &[DirEntry]) {
    println!("{:<40} {:<6} {:<50}", "NAME", "TYPE", "PATH");
    println!("{}", "=".repeat(96));

    for entry in entries {
        println!(
            "{:<40} {:<6} {:<50}",
            truncate(&entry.filename, 40),
            entry.kind.to_string(),
            entry.path
        );
    }

    if entries.is_empty() {
        println!("(empty directory)");
    }
}

// Prints one preview the way it would appear inline under its file
//
// `download_hint` is the command that downloads the file; it's shown for
// binary content we can't display.
pub fn print_preview(path: &str, state: Option<&PreviewState>, download_hint: &str) {
    match state {
        None => println!("Loading preview..."),
        Some(Err(e)) => println!("Error loading file preview: {e}"),
        Some(Ok(PreviewResult::Text { content, markdown })) => {
            if *markdown {
                print!("{}", render_markdown(content));
            } else {
                println!("{content}");
            }
        }
        Some(Ok(PreviewResult::Image(blob))) => {
            println!("[image] {} ({} bytes) {}", path, blob.len(), blob.url());
        }
        Some(Ok(PreviewResult::Video(blob))) => {
            println!("[video/mp4] {} ({} bytes) {}", path, blob.len(), blob.url());
        }
        Some(Ok(PreviewResult::UnsupportedBinary(_))) => {
            println!("Preview is not supported.");
            println!("Download file: {download_hint}");
        }
    }
}

// Prints a whole repository page: listing, inline previews, README
pub fn print_view(view: &RepoView, json: bool) -> Result<()> {
    if json {
        return print_json(&ViewReport::from_view(view));
    }

    let location = if view.dir().is_empty() { "/" } else { view.dir() };
    println!("Repo: {} (branch: {}) {}", view.repo(), view.branch(), location);
    println!();

    if let Some(error) = view.listing_error() {
        println!("Error: {error}");
        return Ok(());
    }

    print_entry_table(&view.entries());

    for (entry, slot) in view.previews() {
        println!();
        println!("--- {} ---", entry.path);
        let hint = download_hint(view.repo(), view.branch(), &entry.path);
        slot.inspect(|state| print_preview(&entry.path, state, &hint));
    }

    if let Some(readme) = view.readme() {
        println!();
        println!("README");
        println!("{}", "=".repeat(70));
        print!("{}", render_markdown(&readme));
    }
    Ok(())
}

pub fn download_hint(repo: &RepoRef, branch: &str, path: &str) -> String {
    format!("repo-browser download {repo} {path} --branch {branch}")
}

// Shortens `text` to at most `max` characters, ending in "..."
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
