use crate::output::{OutputMode, render};
use anyhow::{Context as _, Result};
use clap::Args;
use phasewise_core::JsonFileStore;
use phasewise_core::config::project_config_path;
use serde::Serialize;
use std::path::Path;

use super::store_failure;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `config.toml` with defaults even if it exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[timeline]\n\
    chart_width = 60\n\
    min_bar_columns = 1\n\
    show_months = true\n\
    \n\
    [store]\n\
    lock_timeout_ms = 2000\n";

#[derive(Debug, Serialize)]
struct InitReport {
    workspace: String,
    created: bool,
    config_written: bool,
}

/// Execute `pw init`. Creates the workspace skeleton:
///
/// ```text
/// .phasewise/
///   projects.json   (empty project list)
///   config.toml     (default project config)
/// ```
///
/// Running it again keeps existing projects.
pub fn run_init(args: &InitArgs, output: OutputMode, quiet: bool, project_root: &Path) -> Result<()> {
    let (store, created) =
        JsonFileStore::init(project_root).map_err(|err| store_failure(output, &err))?;

    let config_path = project_config_path(project_root);
    let config_written = args.force || !config_path.exists();
    if config_written {
        std::fs::write(&config_path, CONFIG_TOML)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    }

    let report = InitReport {
        workspace: store.dir().display().to_string(),
        created,
        config_written,
    };

    render(output, &report, |r, w| {
        if r.created {
            writeln!(w, "✓ Initialized {}", r.workspace)?;
        } else {
            writeln!(w, "✓ {} already initialized; projects kept", r.workspace)?;
        }
        if quiet {
            return Ok(());
        }
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  pw project create \"My Project\"")?;
        writeln!(w, "  pw gantt <project-id>")
    })
}
