//! studyhall - LAN e-learning client core
//!
//! A client for a LAN-deployed e-learning backend: users sign in,
//! browse a Class → Subject → Chapter catalog, attach supplementary
//! content to chapters, and track completion progress.
//!
//! # Architecture
//!
//! The core is three pieces of pure logic plus an I/O rim:
//! - The catalog navigator holds the selection chain and the fetched
//!   children at each level; every selection resets downstream state and
//!   late fetch results that no longer match the selection are discarded.
//! - The content classifier maps a loosely-typed content record to a
//!   concrete media kind and rendering strategy, with no I/O.
//! - The progress tracker mirrors the backend's per-user completion
//!   records and derives percentages, never storing them.
//!
//! # Modules
//!
//! - `api`: REST client for the backend, plus the `Backend` trait seam
//! - `catalog`: hierarchy types and the selection navigator
//! - `content`: content items and their classification
//! - `progress`: per-user completion tracking
//! - `workspace`: the signed-in user's working state, tying it together
//! - `session`: session-token lifecycle
//! - `shell`: desktop-shell boundary (open file / reveal in folder)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! studyhall login student@school.lan --password secret
//! studyhall classes
//! studyhall chapter <class-id> <subject-id> <chapter-id>
//! studyhall complete <chapter-id>
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod content;
pub mod progress;
pub mod session;
pub mod shell;
pub mod workspace;

// Re-export main types at crate root for convenience
pub use api::{ApiClient, ApiError, Backend};
pub use catalog::{Chapter, ChapterView, Class, NavState, Navigator, Subject, User};
pub use content::{classify, Classified, ContentItem, MediaKind, MediaPaths, RenderStrategy};
pub use progress::{ProgressRecord, ProgressTracker};
pub use session::Session;
pub use workspace::Workspace;
