//! Entry diff engine.
//!
//! Computes the minimal LDIF `changetype: modify` record that turns one
//! snapshot of a directory entry into another.
//!
//! # Key Types
//!
//! - [`Entry`] / [`Attribute`] / [`Value`] -- Owned entry snapshots
//! - [`compute_diff`] -- Delete, add and replace passes producing a
//!   [`ChangeModifyRecord`](ldif_model::ChangeModifyRecord)
//! - [`TrackedEntry`] -- Commits snapshots and notifies subscribed observers

pub mod diff;
pub mod entry;
pub mod error;
pub mod watch;

pub use diff::{compute_diff, compute_diff_with};
pub use entry::{Attribute, Entry, Value};
pub use error::{EntryError, EntryResult};
pub use watch::{EntryChange, ObserverError, SubscriptionId, TrackedEntry};
