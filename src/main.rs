use std::{env, io, process::ExitCode};

use anyhow::{Context, Result};
use commit_id::{
    app::{CommitIdApp, Invocation, USAGE},
    config,
    git::GitCli,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let version = env!("CARGO_PKG_VERSION");
    let revision = env!("COMMIT_ID_TOOL_REVISION");
    debug!("commit_id v{}.r{}", version, revision);

    let Some(invocation) = Invocation::parse(env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    };

    let paths = config::ConfigPaths::default();
    let settings = match config::load_or_default(&paths) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("config load error: {err:#}");
            config::Settings::default()
        }
    };

    let cwd = env::current_dir().context("failed to determine working directory")?;
    let exe = env::current_exe().context("failed to locate executable")?;
    let repo_dir = settings.working_dir(&cwd, &exe);
    debug!("reading commit metadata from {}", repo_dir.display());

    let app = CommitIdApp::new(settings, GitCli::new(repo_dir), cwd);
    app.run(&invocation, &mut io::stdout().lock())?;
    Ok(ExitCode::SUCCESS)
}
