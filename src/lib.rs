//! # UKE
//!
//! Evidence verification and drift detection for a knowledge base of
//! Learning Objects (LOs). Each LO cites lines of source code as evidence,
//! anchored by a symbol and a hash of the normalized snippet around it.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ Knowledge  │──▶│ Gate / Heal  │──▶│ gate_report.json     │
//! │ YAML LOs   │   │              │   │ status.json, audit/  │
//! └────────────┘   └──────┬───────┘   └──────────────────────┘
//!                         │
//!                         ▼
//!           Locate ──▶ Normalize ──▶ SHA-256
//!         (source tree, read-only)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! uke init
//! uke gate --source-root /path/to/engine
//! uke hash --source-root /path/to/engine Source/Engine/BodySetup.cpp CT_UseSimpleAsComplex
//! uke heal --source-root /path/to/engine --from-sha abc123 --to-sha def456
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Comment and whitespace stripping |
//! | [`locate`] | Symbol-anchored snippet extraction |
//! | [`hash`] | Normalized snippet hashing |
//! | [`schema`] | Field-by-field record validation |
//! | [`knowledge`] | Record discovery and loading |
//! | [`gate`] | Schema and evidence-existence validation |
//! | [`heal`] | Hash-based drift detection |
//! | [`audit`] | Append-only audit trail |
//! | [`report`] | Progress reporting |
//! | [`init`] | Workspace bootstrap |

pub mod audit;
pub mod config;
pub mod gate;
pub mod hash;
pub mod heal;
pub mod init;
pub mod knowledge;
pub mod locate;
pub mod models;
pub mod normalize;
pub mod report;
pub mod schema;
