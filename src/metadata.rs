use anyhow::Result;
use tracing::{debug, warn};

use crate::provider::{HASH_SIZE, RepoMetadataProvider};

pub const UNKNOWN_HASH: &str = "unknown hash";
pub const UNKNOWN_DATE: &str = "unknown date";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    pub hash: String,
    pub hash_size: usize,
    pub date: String,
    pub position: u64,
}

impl Default for CommitMetadata {
    fn default() -> Self {
        Self {
            hash: UNKNOWN_HASH.to_string(),
            hash_size: HASH_SIZE,
            date: UNKNOWN_DATE.to_string(),
            position: 0,
        }
    }
}

impl CommitMetadata {
    /// Gather metadata for the current revision.
    ///
    /// A non-empty `hash_override` is used verbatim and suppresses every
    /// query. Otherwise, when `in_tree` reports version-control metadata,
    /// hash, date and position are queried in that order inside one guarded
    /// block: the first failure stops the remaining queries, and fields
    /// already filled in are kept.
    pub fn resolve(
        provider: &dyn RepoMetadataProvider,
        in_tree: bool,
        hash_override: Option<&str>,
    ) -> Self {
        let mut meta = Self::default();

        if let Some(hash) = hash_override.filter(|h| !h.is_empty()) {
            debug!("commit hash taken from environment: {hash}");
            meta.hash = hash.to_string();
            return meta;
        }

        if !in_tree {
            debug!("no version-control metadata found, using defaults");
            return meta;
        }

        if let Err(err) = meta.query(provider) {
            warn!("commit metadata incomplete: {err:#}");
        }
        meta
    }

    fn query(&mut self, provider: &dyn RepoMetadataProvider) -> Result<()> {
        let hash = provider.short_hash()?;
        if !hash.is_empty() {
            self.hash = hash;
        }
        let date = provider.commit_date()?;
        if !date.is_empty() {
            self.date = date;
        }
        self.position = provider.commit_count()?;
        Ok(())
    }
}
