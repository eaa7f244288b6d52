// src/browse/view.rs
// =============================================================================
// The state behind one repository page: which branch and directory we're
// looking at, the listing, one preview slot per file, and the README.
//
// open(dir) is the "user clicked a directory" step:
// 1. tear down the previous directory's previews (releases binary refs)
// 2. refresh the listing
// 3. preview every file concurrently, and load the README alongside
//
// Previews finish in any order. A failed preview only affects its own slot.
// =============================================================================

use futures::stream::{self, StreamExt};

use super::lister::{DirectoryLister, ListError, ListingSlot};
use super::preview::{ContentPreviewResolver, PreviewSlot};
use super::readme::ReadmeAutoLoader;
use crate::api::{DirEntry, RepoRef};

#[derive(Debug)]
pub struct RepoView {
    repo: RepoRef,
    branch: String,
    dir: String,
    lister: DirectoryLister,
    resolver: ContentPreviewResolver,
    readme: ReadmeAutoLoader,
    listing: ListingSlot,
    previews: Vec<(DirEntry, PreviewSlot)>,
    concurrency: usize,
}

impl RepoView {
    pub fn new(
        lister: DirectoryLister,
        resolver: ContentPreviewResolver,
        repo: RepoRef,
        branch: impl Into<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            repo,
            branch: branch.into(),
            dir: String::new(),
            lister,
            readme: ReadmeAutoLoader::new(resolver.clone()),
            resolver,
            listing: ListingSlot::new(),
            previews: Vec::new(),
            concurrency: concurrency.max(1),
        }
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub async fn open(&mut self, dir: &str) {
        self.close_previews();
        self.dir = dir.to_string();

        self.lister
            .refresh(&self.listing, &self.repo, &self.branch, &self.dir)
            .await;

        let entries = self.entries();
        self.previews = entries
            .iter()
            .filter(|entry| entry.is_file())
            .map(|entry| (entry.clone(), PreviewSlot::new()))
            .collect();

        let resolver = &self.resolver;
        let (repo, branch) = (&self.repo, self.branch.as_str());

        let previews = stream::iter(self.previews.iter())
            .map(|(entry, slot)| resolver.load_into(slot, repo, branch, &entry.path))
            .buffer_unordered(self.concurrency)
            .collect::<Vec<bool>>();
        let readme = self.readme.refresh(repo, branch, &self.dir, &entries);

        tokio::join!(previews, readme);
    }

    // Entries of the current listing (empty while loading or after an error)
    pub fn entries(&self) -> Vec<DirEntry> {
        self.listing
            .inspect(|listing| listing.and_then(|r| r.as_ref().ok()).cloned())
            .unwrap_or_default()
    }

    // The listing error, if the last listing failed
    pub fn listing_error(&self) -> Option<String> {
        self.listing.inspect(|listing| {
            listing
                .and_then(|r| r.as_ref().err())
                .map(ListError::to_string)
        })
    }

    pub fn previews(&self) -> &[(DirEntry, PreviewSlot)] {
        &self.previews
    }

    // How many file previews ended in an error
    pub fn failed_previews(&self) -> usize {
        self.previews
            .iter()
            .filter(|(_, slot)| slot.inspect(|state| matches!(state, Some(Err(_)))))
            .count()
    }

    pub fn readme(&self) -> Option<String> {
        self.readme.current()
    }

    pub fn resolver(&self) -> &ContentPreviewResolver {
        &self.resolver
    }

    // Tears down every slot the view owns
    pub fn close(&mut self) {
        self.close_previews();
        self.listing.teardown();
        self.readme.teardown();
    }

    fn close_previews(&mut self) {
        for (_, slot) in self.previews.drain(..) {
            slot.teardown();
        }
    }
}
