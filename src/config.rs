use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, warn};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "COMMIT_ID_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Checkout used instead of the tool's own repository when it exists,
    /// relative to the invocation's working directory.
    pub override_dir: PathBuf,
    /// Explicit repository directory; wins over everything else.
    pub repo_dir: Option<PathBuf>,
    /// Env var whose value replaces the queried commit hash.
    pub hash_env: String,
    pub macro_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            override_dir: PathBuf::from("external").join("angle"),
            repo_dir: None,
            hash_env: "ANGLE_UPSTREAM_HASH".to_string(),
            macro_prefix: "ANGLE".to_string(),
        }
    }
}

impl Settings {
    /// Pick the directory the git queries run in.
    ///
    /// `cwd` is the invocation's working directory and `exe` the path of the
    /// running binary. Without an explicit `repo_dir` or an existing override
    /// checkout, the repository is taken to be one level above the directory
    /// holding the executable.
    pub fn working_dir(&self, cwd: &Path, exe: &Path) -> PathBuf {
        if let Some(dir) = &self.repo_dir {
            return cwd.join(dir);
        }
        let override_dir = cwd.join(&self.override_dir);
        if override_dir.exists() {
            debug!("using override checkout {}", override_dir.display());
            return override_dir;
        }
        let exe_dir = exe.parent().unwrap_or(Path::new("."));
        let fallback = exe_dir.join("..");
        debug!(
            "no repo_dir or override checkout, using {} next to the executable",
            fallback.display()
        );
        fallback
    }

    /// Value of the hash override env var, ignoring an empty setting.
    pub fn hash_override(&self) -> Option<String> {
        env::var(&self.hash_env).ok().filter(|v| !v.is_empty())
    }
}

pub struct ConfigPaths {
    pub config_file: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self> {
        if let Some(explicit) = env::var_os(CONFIG_ENV) {
            return Ok(Self {
                config_file: PathBuf::from(explicit),
            });
        }
        let dirs = ProjectDirs::from("org", "angle", "commit-id")
            .context("could not determine XDG config dir")?;
        let config_file = dirs.config_dir().join("config.toml");
        Ok(Self { config_file })
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        match ConfigPaths::new() {
            Ok(p) => p,
            Err(err) => {
                let config_file = PathBuf::from("commit-id.toml");
                warn!(
                    "no platform config dir, reading {} instead: {:#}",
                    config_file.display(),
                    err
                );
                ConfigPaths { config_file }
            }
        }
    }
}

pub fn load_or_default(paths: &ConfigPaths) -> Result<Settings> {
    match fs::read_to_string(&paths.config_file) {
        Ok(raw) => {
            let settings: Settings = toml::from_str(&raw).with_context(|| {
                format!("failed to parse config at {}", paths.config_file.display())
            })?;
            Ok(settings)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read config at {}", paths.config_file.display())),
    }
}
