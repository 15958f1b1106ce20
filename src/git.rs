use std::{
    path::{Component, Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::provider::{HASH_SIZE, RepoMetadataProvider};
use crate::refs::{self, Head};

/// Metadata provider backed by the `git` command line.
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// Run `git <args>` in the repository and return its trimmed stdout.
    fn grab_output(&self, args: &[&str]) -> Result<String> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn git_path(&self, flag: &str) -> Result<PathBuf> {
        let raw = self.grab_output(&["rev-parse", flag])?;
        Ok(normalize(&self.repo_dir.join(raw)))
    }
}

impl RepoMetadataProvider for GitCli {
    fn is_inside_tree(&self) -> bool {
        let dot_git = self.repo_dir.join(".git");
        if dot_git.join("HEAD").exists() {
            return true;
        }
        // .git may be a file with a gitdir directive pointing elsewhere.
        if !dot_git.exists() {
            return false;
        }
        match self.grab_output(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(answer) => answer == "true",
            Err(err) => {
                debug!("not inside a work tree: {err:#}");
                false
            }
        }
    }

    fn short_hash(&self) -> Result<String> {
        let short = format!("--short={HASH_SIZE}");
        self.grab_output(&["rev-parse", &short, "HEAD"])
    }

    fn commit_date(&self) -> Result<String> {
        self.grab_output(&["show", "-s", "--format=%ci", "HEAD"])
    }

    fn commit_count(&self) -> Result<u64> {
        let raw = self.grab_output(&["rev-list", "HEAD", "--count"])?;
        raw.parse::<u64>()
            .with_context(|| format!("unexpected commit count {raw:?}"))
    }

    fn resolve_head_dependencies(&self) -> Result<Vec<PathBuf>> {
        let git_dir = self.git_path("--git-dir")?;
        let head_file = git_dir.join("HEAD");
        let common_dir = self.git_path("--git-common-dir")?;

        let mut deps = vec![head_file.clone()];
        if let Head::Symbolic(ref_name) = refs::read_head(&head_file)? {
            let ref_file = common_dir.join(&ref_name);
            if !ref_file.exists() {
                refs::unpack_ref(&ref_name, &ref_file, &common_dir.join("packed-refs"))?;
            }
            deps.push(ref_file);
        }
        Ok(deps)
    }
}

/// Lexically collapse `.` and `..` components without touching the disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_parent_dirs() {
        assert_eq!(
            normalize(Path::new("/work/angle/scripts/../.git")),
            PathBuf::from("/work/angle/.git")
        );
        assert_eq!(normalize(Path::new("/work/./angle/")), PathBuf::from("/work/angle"));
    }

    #[test]
    fn normalize_keeps_leading_parent_dirs_of_relative_paths() {
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn normalize_stops_at_root() {
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn absolute_git_dir_replaces_repo_dir() {
        let repo = Path::new("/work/angle");
        assert_eq!(
            normalize(&repo.join("/elsewhere/.git/worktrees/wt")),
            PathBuf::from("/elsewhere/.git/worktrees/wt")
        );
    }

    #[test]
    fn missing_dot_git_is_outside_tree() {
        let dir = std::env::temp_dir().join(format!(
            "commit_id_git_none_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(!GitCli::new(&dir).is_inside_tree());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
