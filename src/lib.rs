//! In-memory emergency triage desk: a ranked queue and a keyed index.
//!
//! # Examples
//!
//! The structures on their own:
//! ```
//! use triagedesk::core::{index::KeyedIndex, queue::RankedQueue};
//!
//! let mut queue = RankedQueue::with_capacity(8);
//! queue.push("sprained wrist", 3).expect("push");
//! queue.push("chest pain", 1).expect("push");
//! assert_eq!(queue.pop(), Some("chest pain"));
//!
//! let mut index = KeyedIndex::with_capacity(11);
//! index.set("P-1", "sprained wrist").expect("set");
//! assert_eq!(index.get("P-1"), Some(&"sprained wrist"));
//! ```
//!
//! The desk behind the single-owner runtime:
//! ```no_run
//! use triagedesk::{
//!     core::desk::{DeskConfig, TriageDesk},
//!     record::PatientDraft,
//!     runtime::handle::{spawn_desk, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_desk(TriageDesk::new(DeskConfig::default()), RuntimeConfig::default());
//! handle.admit(PatientDraft::new("P-1", 2, "fever")).await.expect("admit");
//! let next = handle.treat_next().await.expect("treat");
//! assert_eq!(next.map(|r| r.id), Some("P-1".to_string()));
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

#![deny(missing_docs)]

/// Ranked queue, keyed index, hashing, and the desk facade.
pub mod core;
/// Operator console parsing and rendering.
pub mod console;
/// Patient records and the delimited payload codec.
pub mod record;
/// Single-owner runtime handle and events.
pub mod runtime;
/// Shared primitive types and constants.
pub mod types;
