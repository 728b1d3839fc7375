//! Workspace bootstrap for `uke init`.
//!
//! Creates the knowledge, output and audit directories and a starter config
//! file. Existing files are never overwritten, so the command is safe to run
//! repeatedly.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

const CONFIG_TEMPLATE: &str = r#"# UKE configuration. Relative paths resolve against this file's directory.

[paths]
knowledge_root = "knowledge/learning_objects"
output_root = "out"
# source_root = "/path/to/engine"

[evidence]
# Lines of context hashed around each evidence symbol.
context_lines = 40

[knowledge]
include_globs = ["**/*.yml", "**/*.yaml"]
exclude_globs = []
"#;

/// What `init` did for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStep {
    Created(PathBuf),
    Exists(PathBuf),
}

/// Bootstrap a workspace whose config lives at `config_path`.
pub fn run_init(config_path: &Path) -> Result<Vec<InitStep>> {
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut steps = Vec::new();

    if config_path.exists() {
        steps.push(InitStep::Exists(config_path.to_path_buf()));
    } else {
        std::fs::create_dir_all(base)
            .with_context(|| format!("Failed to create {}", base.display()))?;
        std::fs::write(config_path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        steps.push(InitStep::Created(config_path.to_path_buf()));
    }

    let config = crate::config::load_config(config_path)?;
    for dir in workspace_dirs(&config) {
        if dir.is_dir() {
            steps.push(InitStep::Exists(dir));
        } else {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            steps.push(InitStep::Created(dir));
        }
    }

    Ok(steps)
}

fn workspace_dirs(config: &Config) -> Vec<PathBuf> {
    vec![
        config.paths.knowledge_root.clone(),
        config.paths.output_root.clone(),
        config.audit_dir(),
    ]
}
