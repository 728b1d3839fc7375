//! TOML configuration.
//!
//! Bundles the three roots every pass needs (knowledge, source, output) plus
//! the evidence window size and the record globs. Relative paths are
//! resolved against the directory holding the config file, so results do
//! not depend on the process working directory.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::locate::DEFAULT_CONTEXT_LINES;

/// File name written by `uke init` and read by default.
pub const DEFAULT_CONFIG_FILE: &str = "uke.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_knowledge_root")]
    pub knowledge_root: PathBuf,
    /// Optional here; `uke heal` requires it from either config or CLI.
    #[serde(default)]
    pub source_root: Option<PathBuf>,
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            knowledge_root: default_knowledge_root(),
            source_root: None,
            output_root: default_output_root(),
        }
    }
}

fn default_knowledge_root() -> PathBuf {
    PathBuf::from("knowledge/learning_objects")
}
fn default_output_root() -> PathBuf {
    PathBuf::from("out")
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvidenceConfig {
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
        }
    }
}

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.yml".to_string(), "**/*.yaml".to_string()]
}

impl Config {
    /// Configuration rooted at `base`, with every default applied.
    pub fn rooted_at(base: &Path) -> Self {
        let mut config = Config::default();
        config.resolve_relative_to(base);
        config
    }

    pub fn gate_report_path(&self) -> PathBuf {
        self.paths.output_root.join("gate_report.json")
    }

    pub fn status_path(&self) -> PathBuf {
        self.paths.output_root.join("status.json")
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.paths.output_root.join("audit")
    }

    /// Override the configured source root, e.g. from a CLI flag.
    pub fn with_source_root(mut self, source_root: Option<PathBuf>) -> Self {
        if source_root.is_some() {
            self.paths.source_root = source_root;
        }
        self
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.paths.knowledge_root = resolve(&self.paths.knowledge_root);
        self.paths.output_root = resolve(&self.paths.output_root);
        self.paths.source_root = self.paths.source_root.as_deref().map(resolve);
    }
}

impl KnowledgeConfig {
    pub fn include_set(&self) -> Result<GlobSet> {
        build_globset(&self.include_globs)
    }

    pub fn exclude_set(&self) -> Result<GlobSet> {
        build_globset(&self.exclude_globs)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {} (run `uke init` to create one)",
            path.display()
        )
    })?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    if config.evidence.context_lines == 0 {
        bail!("evidence.context_lines must be > 0");
    }

    if config.knowledge.include_globs.is_empty() {
        bail!("knowledge.include_globs must not be empty");
    }
    config
        .knowledge
        .include_set()
        .context("Invalid pattern in knowledge.include_globs")?;
    config
        .knowledge
        .exclude_set()
        .context("Invalid pattern in knowledge.exclude_globs")?;

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_relative_to(base);

    Ok(config)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
