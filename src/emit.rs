use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use crate::git::normalize;
use crate::metadata::CommitMetadata;

/// Render the four `#define` lines for `meta`.
pub fn header_text(meta: &CommitMetadata, macro_prefix: &str) -> String {
    format!(
        "#define {p}_COMMIT_HASH \"{}\"\n\
         #define {p}_COMMIT_HASH_SIZE {}\n\
         #define {p}_COMMIT_DATE \"{}\"\n\
         #define {p}_COMMIT_POSITION {}\n",
        meta.hash,
        meta.hash_size,
        meta.date,
        meta.position,
        p = macro_prefix,
    )
}

/// Overwrite `output` with the header for `meta`.
pub fn write_header(output: &Path, meta: &CommitMetadata, macro_prefix: &str) -> Result<()> {
    fs::write(output, header_text(meta, macro_prefix))
        .with_context(|| format!("failed to write header {}", output.display()))?;
    debug!("wrote {}", output.display());
    Ok(())
}

/// Render `<output>: <dep> <dep>...` with every dependency relative to `cwd`.
pub fn depfile_text(output: &Path, deps: &[PathBuf], cwd: &Path) -> String {
    let rendered: Vec<String> = deps
        .iter()
        .map(|dep| relative_to(&cwd.join(dep), cwd).display().to_string())
        .collect();
    format!("{}: {}\n", output.display(), rendered.join(" "))
}

pub fn write_depfile(depfile: &Path, output: &Path, deps: &[PathBuf], cwd: &Path) -> Result<()> {
    fs::write(depfile, depfile_text(output, deps, cwd))
        .with_context(|| format!("failed to write depfile {}", depfile.display()))?;
    debug!("wrote {} with {} inputs", depfile.display(), deps.len());
    Ok(())
}

/// Express `path` relative to `base`, both taken lexically.
///
/// Paths on different prefixes (e.g. other drive letters) come back absolute.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);
    let mut path_parts = path.components().peekable();
    let mut base_parts = base.components().peekable();

    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) =
        (path_parts.peek(), base_parts.peek())
    {
        if a != b {
            return path.clone();
        }
    }

    while let (Some(a), Some(b)) = (path_parts.peek(), base_parts.peek()) {
        if a != b {
            break;
        }
        path_parts.next();
        base_parts.next();
    }

    let mut rel = PathBuf::new();
    for _ in base_parts {
        rel.push("..");
    }
    for part in path_parts {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_four_lines_in_order() {
        let meta = CommitMetadata {
            hash: "0123456789ab".to_string(),
            hash_size: 12,
            date: "2024-03-05 14:02:11 +0100".to_string(),
            position: 23017,
        };
        assert_eq!(
            header_text(&meta, "ANGLE"),
            "#define ANGLE_COMMIT_HASH \"0123456789ab\"\n\
             #define ANGLE_COMMIT_HASH_SIZE 12\n\
             #define ANGLE_COMMIT_DATE \"2024-03-05 14:02:11 +0100\"\n\
             #define ANGLE_COMMIT_POSITION 23017\n"
        );
    }

    #[test]
    fn default_header() {
        let text = header_text(&CommitMetadata::default(), "ANGLE");
        assert!(text.contains("#define ANGLE_COMMIT_HASH \"unknown hash\"\n"));
        assert!(text.contains("#define ANGLE_COMMIT_DATE \"unknown date\"\n"));
        assert!(text.ends_with("#define ANGLE_COMMIT_POSITION 0\n"));
    }

    #[test]
    fn depfile_line() {
        let deps = vec![
            PathBuf::from("/src/angle/.git/HEAD"),
            PathBuf::from("/src/angle/.git/refs/heads/main"),
        ];
        let text = depfile_text(Path::new("commit.h"), &deps, Path::new("/src/angle"));
        assert_eq!(text, "commit.h: .git/HEAD .git/refs/heads/main\n");
    }

    #[test]
    fn depfile_without_inputs() {
        let text = depfile_text(Path::new("gen/commit.h"), &[], Path::new("/out"));
        assert_eq!(text, "gen/commit.h: \n");
    }

    #[test]
    fn relative_paths_climb_out_of_build_dir() {
        assert_eq!(
            relative_to(Path::new("/src/angle/.git/HEAD"), Path::new("/src/angle/out/Debug")),
            PathBuf::from("../../.git/HEAD")
        );
        assert_eq!(
            relative_to(Path::new("/src/angle"), Path::new("/src/angle")),
            PathBuf::from(".")
        );
    }
}
