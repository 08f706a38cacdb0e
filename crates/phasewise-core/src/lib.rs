//! phasewise-core library.
//!
//! Project phases, duration labels and the Gantt timeline layout, plus the
//! record boundary and file store that keep projects on disk.
//!
//! # Conventions
//!
//! - **Errors**: boundaries return `thiserror` enums that map to an
//!   [`error::ErrorCode`]; config loading uses `anyhow::Result`.
//! - **Logging**: `tracing` macros (`debug!` for recomputation, `info!` for
//!   mutations, `warn!` for skipped records).

pub mod config;
pub mod duration;
pub mod editor;
pub mod error;
pub mod model;
pub mod overview;
pub mod record;
pub mod store;
pub mod timeline;
pub mod users;

pub use duration::{SpanBreakdown, compute_duration, compute_duration_opt, leading_count};
pub use editor::PhaseDraft;
pub use error::ErrorCode;
pub use overview::PortfolioSummary;
pub use store::{JsonFileStore, MemoryStore, ProjectRepo, ProjectStore, StoreError};
pub use timeline::{TimelineLayout, layout};
pub use users::{UserDirectory, UserSource};
