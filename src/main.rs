//! # UKE CLI (`uke`)
//!
//! Validates Learning Object records and detects drift between their cited
//! evidence and a live source tree.
//!
//! ## Usage
//!
//! ```bash
//! uke --config ./uke.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `uke init` | Create the config file and workspace directories |
//! | `uke gate` | Schema-check records and confirm evidence files exist |
//! | `uke heal` | Re-hash all evidence and flag drift for review |
//! | `uke hash <file> <symbol>` | Print the evidence hash for an anchor |
//!
//! ## Exit status
//!
//! Records flagged `invalid` or `needs_review` are ordinary results; the
//! process exits 0. A non-zero exit means a report or audit entry could not
//! be written, or the configuration is unusable.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use uke::config::{self, Config};
use uke::gate::run_gate;
use uke::hash::hash_evidence;
use uke::heal::run_heal;
use uke::init::{run_init, InitStep};
use uke::report::ReportMode;

/// UKE — evidence verification and drift detection for a source-anchored
/// knowledge base.
#[derive(Parser)]
#[command(
    name = "uke",
    about = "UKE — evidence verification and drift detection for Learning Objects",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Relative paths inside it resolve against its directory.
    #[arg(long, global = true, default_value = "./uke.toml")]
    config: PathBuf,

    /// Progress output on stderr: `auto`, `off`, `human`, or `json`.
    ///
    /// `auto` shows human progress when stderr is a terminal.
    #[arg(long, global = true, default_value = "auto", value_parser = parse_mode)]
    progress: ReportMode,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the config file and workspace directories.
    ///
    /// Never overwrites existing files; safe to run repeatedly.
    Init,

    /// Validate Learning Objects and their evidence files.
    ///
    /// Writes `gate_report.json` and `status.json` under the output root,
    /// replacing any previous results.
    Gate {
        /// Source tree the evidence paths are relative to. Without it only
        /// the schema is checked.
        #[arg(long, alias = "engine")]
        source_root: Option<PathBuf>,

        /// Skip evidence file existence checks even when a source root is set.
        #[arg(long, alias = "no-capture")]
        skip_evidence: bool,
    },

    /// Re-hash every evidence snippet and flag drift for review.
    ///
    /// Appends one audit entry per evidence item and rewrites `status.json`.
    /// The revisions are recorded in the audit trail; every evidence item is
    /// checked regardless of what changed between them.
    Heal {
        /// Source tree to verify against. Required unless set in config.
        #[arg(long, alias = "engine")]
        source_root: Option<PathBuf>,

        /// Revision the evidence was last verified at.
        #[arg(long)]
        from_sha: String,

        /// Revision of the source tree being verified.
        #[arg(long)]
        to_sha: String,
    },

    /// Print the evidence hash for a file and symbol.
    ///
    /// Use the output as `snippet_hash` when authoring evidence. Nothing is
    /// written.
    Hash {
        /// Path relative to the source root.
        file: String,

        /// Literal text anchoring the snippet.
        symbol: String,

        #[arg(long, alias = "engine")]
        source_root: Option<PathBuf>,

        /// Override `evidence.context_lines`.
        #[arg(long)]
        context_lines: Option<usize>,
    },
}

fn parse_mode(s: &str) -> Result<ReportMode, String> {
    ReportMode::parse(s).ok_or_else(|| format!("invalid progress mode '{}'", s))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let reporter = cli.progress.reporter();

    match cli.command {
        Commands::Init => {
            for step in run_init(&cli.config)? {
                match step {
                    InitStep::Created(p) => println!("created  {}", p.display()),
                    InitStep::Exists(p) => println!("exists   {}", p.display()),
                }
            }
            println!("Initialization complete.");
        }
        Commands::Gate {
            source_root,
            skip_evidence,
        } => {
            let cfg = config::load_config(&cli.config)?.with_source_root(source_root);
            let report = run_gate(&cfg, skip_evidence, reporter.as_ref())?;
            println!("Validation complete.");
            println!("Report saved to {}", cfg.gate_report_path().display());
            println!(
                "Status: {}/{} LOs verified.",
                report.verified_count(),
                report.total()
            );
        }
        Commands::Heal {
            source_root,
            from_sha,
            to_sha,
        } => {
            let cfg = config::load_config(&cli.config)?.with_source_root(source_root);
            let summary = run_heal(&cfg, &from_sha, &to_sha, reporter.as_ref())?;
            println!(
                "Heal complete. Checked {} LOs. Flagged {} for review.",
                summary.lo_checked, summary.flagged
            );
            println!(
                "Evidence: {} verified, {} flagged, {} errors.",
                summary.verified, summary.flagged, summary.errors
            );
        }
        Commands::Hash {
            file,
            symbol,
            source_root,
            context_lines,
        } => {
            let cfg = if cli.config.exists() {
                config::load_config(&cli.config)?
            } else {
                Config::rooted_at(Path::new("."))
            }
            .with_source_root(source_root);
            let Some(root) = cfg.paths.source_root.as_deref() else {
                anyhow::bail!("hash requires a source root (--source-root or paths.source_root)");
            };
            let lines = context_lines.unwrap_or(cfg.evidence.context_lines);
            println!("{}", hash_evidence(root, &file, &symbol, lines)?);
        }
    }

    Ok(())
}
