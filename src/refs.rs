use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use tracing::info;

/// Contents of a HEAD file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// `ref: refs/heads/<branch>`
    Symbolic(String),
    /// Detached HEAD holding a commit hash directly.
    Detached(String),
}

pub fn parse_head(contents: &str) -> Result<Head> {
    let mut fields = contents.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some("ref:"), Some(name)) => Ok(Head::Symbolic(name.to_string())),
        (Some("ref:"), None) => bail!("HEAD names a symbolic ref without a target"),
        (Some(hash), _) => Ok(Head::Detached(hash.to_string())),
        (None, _) => bail!("HEAD is empty"),
    }
}

pub fn read_head(head_file: &Path) -> Result<Head> {
    let contents = fs::read_to_string(head_file)
        .with_context(|| format!("failed to read {}", head_file.display()))?;
    parse_head(&contents)
        .with_context(|| format!("failed to parse {}", head_file.display()))
}

/// Find the hash packed for `ref_name`.
///
/// Exactly one entry must match; none or several means the ref store is
/// corrupt or ambiguous and is reported as an error.
pub fn find_packed_ref(packed_refs: &str, ref_name: &str) -> Result<String> {
    let matches: Vec<&str> = packed_refs
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('^'))
        .filter_map(|line| line.split_once(' '))
        .filter(|(_, name)| *name == ref_name)
        .map(|(hash, _)| hash)
        .collect();

    match matches.as_slice() {
        [hash] => Ok((*hash).to_string()),
        [] => bail!("ref {ref_name} not found in packed-refs"),
        many => bail!(
            "ref {ref_name} listed {} times in packed-refs",
            many.len()
        ),
    }
}

/// Write the loose ref file for `ref_name` using the hash stored in
/// `packed_refs_file`. The written file holds `<hash>\n`.
pub fn unpack_ref(ref_name: &str, ref_file: &Path, packed_refs_file: &Path) -> Result<()> {
    let packed = fs::read_to_string(packed_refs_file)
        .with_context(|| format!("failed to read {}", packed_refs_file.display()))?;
    let hash = find_packed_ref(&packed, ref_name)
        .with_context(|| format!("cannot unpack from {}", packed_refs_file.display()))?;

    if let Some(dir) = ref_file.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create ref dir {}", dir.display()))?;
    }
    fs::write(ref_file, format!("{hash}\n"))
        .with_context(|| format!("failed to write {}", ref_file.display()))?;
    info!("unpacked {ref_name} into {}", ref_file.display());
    Ok(())
}
