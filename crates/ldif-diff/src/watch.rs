//! Change notification for a tracked entry.
//!
//! A [`TrackedEntry`] holds the last committed snapshot of one entry.
//! Committing a new snapshot computes the diff against the previous one and
//! hands it to every subscribed observer, in subscription order. An
//! observer that returns an error or panics is logged and skipped; the
//! remaining observers still run.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use ldif_model::{ChangeModifyRecord, EncodingRules};

use crate::diff::compute_diff_with;
use crate::entry::Entry;

/// Error type observers may return.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

type Observer = Box<dyn FnMut(&EntryChange) -> Result<(), ObserverError> + Send>;

/// Handle identifying one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// A committed change to a tracked entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryChange {
    pub dn: String,
    pub record: ChangeModifyRecord,
}

/// One entry plus the observers interested in its changes.
pub struct TrackedEntry {
    current: Entry,
    rules: EncodingRules,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl TrackedEntry {
    /// Track an entry under the default encoding rules.
    pub fn new(entry: Entry) -> Self {
        Self::with_rules(entry, EncodingRules::default())
    }

    /// Track an entry, encoding diff values under `rules`.
    pub fn with_rules(entry: Entry, rules: EncodingRules) -> Self {
        Self {
            current: entry,
            rules,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// The last committed snapshot.
    pub fn current(&self) -> &Entry {
        &self.current
    }

    /// Register an observer called synchronously after each committed change.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&EntryChange) -> Result<(), ObserverError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Replace the tracked snapshot and notify observers of the difference.
    ///
    /// Returns the change, or `None` when the snapshots are equivalent (in
    /// which case nobody is notified).
    pub fn commit(&mut self, snapshot: Entry) -> Option<EntryChange> {
        let record = compute_diff_with(&self.current, &snapshot, &self.rules);
        let dn = self.current.dn().to_string();
        self.current = snapshot;

        let change = EntryChange { dn, record: record? };
        self.notify(&change);
        Some(change)
    }

    fn notify(&mut self, change: &EntryChange) {
        debug!(
            dn = %change.dn,
            observers = self.observers.len(),
            "notifying entry observers"
        );
        for (id, observer) in &mut self.observers {
            match panic::catch_unwind(AssertUnwindSafe(|| observer(change))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(subscription = %id, dn = %change.dn, error = %e, "entry observer failed");
                }
                Err(payload) => {
                    warn!(
                        subscription = %id,
                        dn = %change.dn,
                        panic = panic_message(payload.as_ref()),
                        "entry observer panicked"
                    );
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic payload"
    }
}

impl fmt::Debug for TrackedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedEntry")
            .field("current", &self.current)
            .field("rules", &self.rules)
            .field("observers", &self.observers.len())
            .finish()
    }
}
