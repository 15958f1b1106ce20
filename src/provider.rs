//! The seam between commit stamping and the version-control system.

use std::path::PathBuf;

use anyhow::Result;

/// Length of the abbreviated commit hash written to the header.
pub const HASH_SIZE: usize = 12;

/// Read-only view of a repository's commit metadata.
///
/// Every query is independent and runs at most once per invocation; callers
/// decide how failures degrade.
pub trait RepoMetadataProvider {
    /// Whether the working directory is inside a managed tree.
    fn is_inside_tree(&self) -> bool;

    /// Abbreviated hash of the current revision, [`HASH_SIZE`] characters.
    fn short_hash(&self) -> Result<String>;

    /// Committer date of the current revision, e.g. `2024-05-01 10:22:03 +0200`.
    fn commit_date(&self) -> Result<String>;

    /// Number of commits reachable from the current revision.
    fn commit_count(&self) -> Result<u64>;

    /// Files whose modification should invalidate a generated header: the
    /// HEAD pointer and, for a symbolic HEAD, the loose ref it names.
    ///
    /// May unpack the ref out of `packed-refs` so the returned file exists.
    fn resolve_head_dependencies(&self) -> Result<Vec<PathBuf>>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::Cell;
    use std::path::PathBuf;

    use anyhow::{Result, anyhow};

    use super::RepoMetadataProvider;

    /// Scripted provider; `None` answers fail the query.
    #[derive(Default)]
    pub struct FakeRepo {
        pub inside: bool,
        pub hash: Option<String>,
        pub date: Option<String>,
        pub count: Option<u64>,
        pub deps: Vec<PathBuf>,
        pub queries: Cell<usize>,
    }

    impl FakeRepo {
        pub fn healthy() -> Self {
            Self {
                inside: true,
                hash: Some("0123456789ab".to_string()),
                date: Some("2024-03-05 14:02:11 +0100".to_string()),
                count: Some(23017),
                deps: vec![
                    PathBuf::from(".git/HEAD"),
                    PathBuf::from(".git/refs/heads/main"),
                ],
                queries: Cell::new(0),
            }
        }

        fn answer<T: Clone>(&self, what: &str, value: &Option<T>) -> Result<T> {
            self.queries.set(self.queries.get() + 1);
            value.clone().ok_or_else(|| anyhow!("{what} query failed"))
        }
    }

    impl RepoMetadataProvider for FakeRepo {
        fn is_inside_tree(&self) -> bool {
            self.inside
        }

        fn short_hash(&self) -> Result<String> {
            self.answer("hash", &self.hash)
        }

        fn commit_date(&self) -> Result<String> {
            self.answer("date", &self.date)
        }

        fn commit_count(&self) -> Result<u64> {
            self.answer("count", &self.count)
        }

        fn resolve_head_dependencies(&self) -> Result<Vec<PathBuf>> {
            Ok(self.deps.clone())
        }
    }
}
