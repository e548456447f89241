//! wpstage Jobs - item lifecycle and background processing.
//!
//! An uploaded archive becomes an [`ItemRecord`](wpstage_core::ItemRecord)
//! and moves through:
//!
//! ```text
//! uploaded -> analyzing -> ready_to_upload -> building -> built -> published
//!                       \-> needs_review --(review)--^
//! ```
//!
//! [`Pipeline`] implements each step against an [`ItemStore`];
//! [`JobQueue`] runs analyze and build steps on a bounded worker pool and
//! streams [`JobEvent`]s, chaining a build after every 10/10 analysis.

pub mod error;
pub mod events;
pub mod pipeline;
pub mod queue;
pub mod store;

pub use error::{Error, Result};
pub use events::{channel_sink, null_sink, Job, JobAction, JobEvent, LogSink};
pub use pipeline::{BuildReport, Pipeline};
pub use queue::JobQueue;
pub use store::{ItemStore, JsonItemStore, MemoryItemStore};
