//! Change notifications.
//!
//! Each `VirtualFs` owns its observer list; there is no process-wide bus.
//! Delivery is synchronous and in mutation order, after the change is in
//! place. Observers run while the caller still holds whatever lock guards the
//! tree, so they must not call back into it; record what changed and act
//! later.

use std::fmt;

use strum::{AsRefStr, Display};
use uigen_types::NodeType;

/// What kind of mutation happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Renamed,
    /// The whole tree was swapped (deserialize or reset).
    Replaced,
}

/// One change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VfsEvent {
    pub kind: ChangeKind,
    /// The affected path (the destination, for renames).
    pub path: String,
    /// Source path of a rename.
    pub from: Option<String>,
    /// Type of the affected node (`None` for `Replaced`).
    pub node_type: Option<NodeType>,
    /// Tree revision after this change.
    pub revision: u64,
}

impl fmt::Display for VfsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{} {} -> {} @{}", self.kind, from, self.path, self.revision),
            None => write!(f, "{} {} @{}", self.kind, self.path, self.revision),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Observer callback.
pub type Observer = Box<dyn Fn(&VfsEvent) + Send + Sync>;

/// Ordered observer list.
#[derive(Default)]
pub(crate) struct Observers {
    entries: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&self, event: &VfsEvent) {
        for (_, observer) in &self.entries {
            observer(event);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
