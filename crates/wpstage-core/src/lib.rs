//! wpstage Core - shared data model for WordPress package analysis.
//!
//! This crate defines the plain-data types that flow between the
//! analyzer, the builder and the orchestration layer:
//!
//! - [`HeaderInfo`], [`Candidate`] and [`ScanOutcome`]: what the scanner finds
//! - [`AnalysisResult`]: the scoring engine's verdict for one archive
//! - [`BuildOutput`] and [`TreeNode`]: what the build step produces
//! - [`ItemRecord`] and [`ItemStatus`]: the persisted item lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  wpstage-cli    │  (User interface)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐      ┌──────────────────┐
//! │  wpstage-jobs   │─────▶│  wpstage-remote  │
//! └────────┬────────┘      └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐      ┌──────────────────┐
//! │wpstage-analyzer │      │ wpstage-builder  │
//! └────────┬────────┘      └────────┬─────────┘
//!          └──────────┬─────────────┘
//!                     ▼
//!          ┌─────────────────┐
//!          │  wpstage-core   │  (This crate - shared types)
//!          └─────────────────┘
//! ```
//!
//! Nothing in this crate touches the filesystem or the network.

pub mod error;
pub mod record;
pub mod types;

pub use error::{Error, Result};
pub use record::{ItemRecord, ItemStatus, ReviewOverrides};
pub use types::{
    AnalysisResult, BuildOutput, BuildSpec, Candidate, HeaderInfo, PackageKind, ScanMode, ScanOutcome, TreeNode,
    ANALYSIS_SCHEMA_VERSION, MAX_SCORE, VALID_THRESHOLD,
};
