use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{config::Settings, emit, metadata::CommitMetadata, provider::RepoMetadataProvider};

pub const USAGE: &str = "\
Usage: commit_id position               - print commit position
       commit_id gen <output> [depfile] - generate commit.h";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print the commit position.
    Position,
    /// Write the header, plus a depfile when one is named.
    Gen {
        output: PathBuf,
        depfile: Option<PathBuf>,
    },
}

impl Invocation {
    /// Parse the arguments following the program name. `None` means the
    /// caller should print [`USAGE`].
    pub fn parse<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match args.as_slice() {
            [op] if op == "position" => Some(Self::Position),
            [op, output] if op == "gen" => Some(Self::Gen {
                output: PathBuf::from(output),
                depfile: None,
            }),
            [op, output, depfile] if op == "gen" => Some(Self::Gen {
                output: PathBuf::from(output),
                depfile: Some(PathBuf::from(depfile)),
            }),
            _ => None,
        }
    }
}

pub struct CommitIdApp<P> {
    pub settings: Settings,
    pub provider: P,
    /// Value of the hash override env var, if set.
    pub hash_override: Option<String>,
    /// Directory the invocation was started from; depfile paths are relative
    /// to it.
    pub cwd: PathBuf,
}

impl<P: RepoMetadataProvider> CommitIdApp<P> {
    pub fn new(settings: Settings, provider: P, cwd: impl Into<PathBuf>) -> Self {
        let hash_override = settings.hash_override();
        Self {
            settings,
            provider,
            hash_override,
            cwd: cwd.into(),
        }
    }

    pub fn run(&self, invocation: &Invocation, out: &mut dyn Write) -> Result<()> {
        match invocation {
            Invocation::Position => {
                let position = self.position();
                writeln!(out, "{position}").context("failed to print commit position")?;
                Ok(())
            }
            Invocation::Gen { output, depfile } => self.generate(output, depfile.as_deref()),
        }
    }

    /// Commit count of the current revision, or 0 without usable metadata.
    pub fn position(&self) -> u64 {
        if !self.provider.is_inside_tree() {
            return 0;
        }
        match self.provider.commit_count() {
            Ok(count) => count,
            Err(err) => {
                warn!("commit position unavailable: {err:#}");
                0
            }
        }
    }

    pub fn generate(&self, output: &Path, depfile: Option<&Path>) -> Result<()> {
        let in_tree = self.provider.is_inside_tree();
        let meta = CommitMetadata::resolve(&self.provider, in_tree, self.hash_override.as_deref());
        info!(
            "stamping {} with {} (position {})",
            output.display(),
            meta.hash,
            meta.position
        );
        emit::write_header(output, &meta, &self.settings.macro_prefix)?;

        let Some(depfile) = depfile else {
            return Ok(());
        };
        let deps = if in_tree {
            self.provider.resolve_head_dependencies()?
        } else {
            Vec::new()
        };
        emit::write_depfile(depfile, output, &deps, &self.cwd)
    }
}
