//! Graph nodes.
//!
//! A node wraps one user function. [`Source`] nodes bring data into the
//! graph, [`Transform`] nodes read one merged input and write one broadcast
//! output, and [`Sink`] nodes consume their input and signal completion.

mod outlet;
mod sink;
mod source;
mod transform;

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

pub use outlet::{ErasedOutlet, Outlet};
pub use sink::Sink;
pub use source::Source;
pub use transform::Transform;

pub(crate) use outlet::Outlets;

/// Process-unique identity of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        NodeId(raw)
    }

    /// The raw numeric id
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a node. A node moves forward only, and starts at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeState {
    /// Wired or still being wired; no task exists
    Unstarted,
    /// The node's task has been spawned and its function has not returned
    Running,
    /// The node's function returned
    Finished,
}

impl NodeState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => NodeState::Unstarted,
            1 => NodeState::Running,
            _ => NodeState::Finished,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Unstarted => write!(f, "unstarted"),
            NodeState::Running => write!(f, "running"),
            NodeState::Finished => write!(f, "finished"),
        }
    }
}

/// Identity, name and lifecycle state shared by every node kind.
pub(crate) struct NodeCore {
    id: NodeId,
    name: String,
    state: AtomicU8,
}

impl NodeCore {
    pub(crate) fn new(kind: &str, name: Option<String>) -> Self {
        let id = NodeId::next();
        let name = name.unwrap_or_else(|| format!("{kind}{id}"));
        Self {
            id,
            name,
            state: AtomicU8::new(NodeState::Unstarted as u8),
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> NodeState {
        NodeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move `Unstarted -> Running`. Only one caller ever wins.
    pub(crate) fn claim(&self) -> bool {
        let claimed = self
            .state
            .compare_exchange(
                NodeState::Unstarted as u8,
                NodeState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if claimed {
            tracing::trace!(node = %self.name, id = %self.id, "running");
        }
        claimed
    }

    pub(crate) fn finish(&self) {
        self.state
            .store(NodeState::Finished as u8, Ordering::Release);
        tracing::trace!(node = %self.name, id = %self.id, "finished");
    }
}
