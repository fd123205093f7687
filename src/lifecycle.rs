//! Start protocol and completion signalling.
//!
//! Starting a Source first plans the reachable graph (a depth-first walk with
//! an explicit visited set) and validates it, so every configuration error
//! surfaces before any task runs. The plan is then launched in post-order:
//! every consumer is running before the producers that feed it.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::node::{NodeId, NodeState};

/// A node that can be reached, validated and launched by the start walk.
pub(crate) trait Launch: Send + Sync {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    fn state(&self) -> NodeState;

    /// Nodes this node feeds
    fn downstream(&self) -> Vec<Arc<dyn Launch>>;

    /// False for a producer with no wired receivers
    fn has_receivers(&self) -> bool;

    /// Claim the node and spawn its task. Returns false if another starter
    /// already claimed it.
    fn launch(self: Arc<Self>, runtime: &Handle) -> bool;
}

/// The runtime node tasks are spawned onto.
pub(crate) fn runtime_for(node: &str) -> Result<Handle> {
    Handle::try_current().map_err(|_| Error::NoRuntime {
        node: node.to_string(),
    })
}

/// Unstarted nodes reachable from a set of roots, consumers first.
pub(crate) struct Plan {
    order: Vec<Arc<dyn Launch>>,
}

impl Plan {
    pub(crate) fn downstream_of(roots: Vec<Arc<dyn Launch>>) -> Result<Self> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for root in roots {
            visit(root, &mut visited, &mut order)?;
        }
        Ok(Self { order })
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Launch every planned node, returning how many this call claimed.
    pub(crate) fn launch(self, runtime: &Handle) -> usize {
        let mut launched = 0;
        for node in self.order {
            let name = node.name().to_string();
            if node.launch(runtime) {
                launched += 1;
            } else {
                tracing::trace!(node = %name, "already started elsewhere");
            }
        }
        launched
    }
}

fn visit(
    node: Arc<dyn Launch>,
    visited: &mut HashSet<NodeId>,
    order: &mut Vec<Arc<dyn Launch>>,
) -> Result<()> {
    if !visited.insert(node.id()) {
        return Ok(());
    }
    // Started nodes have already started everything below them.
    if node.state() != NodeState::Unstarted {
        return Ok(());
    }
    if !node.has_receivers() {
        return Err(Error::no_receivers(node.name()));
    }
    for next in node.downstream() {
        visit(next, visited, order)?;
    }
    order.push(node);
    Ok(())
}

/// One-shot signal that a Sink's function has returned.
///
/// Cloneable, and can be awaited any number of times, before or after the
/// sink finishes.
#[derive(Clone)]
pub struct Completion {
    node: String,
    done: watch::Receiver<bool>,
}

/// Write side of a [`Completion`], owned by the sink's task once it runs.
///
/// Dropping an armed signal without firing it closes the completion with a
/// failure, which every waiter observes as [`Error::StageFailure`].
pub(crate) struct CompletionSignal {
    done: watch::Sender<bool>,
    node: String,
    armed: bool,
}

impl CompletionSignal {
    /// Mark the signal as owned by a running sink.
    pub(crate) fn arm(mut self) -> Self {
        self.armed = true;
        self
    }

    pub(crate) fn fire(mut self) {
        self.done.send_replace(true);
        self.armed = false;
    }
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        if self.armed {
            tracing::error!(node = %self.node, "sink stopped before completing");
        }
    }
}

pub(crate) fn completion(node: impl Into<String>) -> (CompletionSignal, Completion) {
    let node = node.into();
    let (tx, rx) = watch::channel(false);
    (
        CompletionSignal {
            done: tx,
            node: node.clone(),
            armed: false,
        },
        Completion { node, done: rx },
    )
}

impl Completion {
    /// Wait until the sink has consumed all of its input.
    ///
    /// Fails with [`Error::StageFailure`] when the sink's task went away
    /// without finishing, for example because its function panicked.
    pub async fn wait(&self) -> Result<()> {
        let mut done = self.done.clone();
        let result = done.wait_for(|finished| *finished).await.map(|_| ());
        result.map_err(|_| Error::StageFailure {
            node: self.node.clone(),
        })
    }

    /// Returns true once the sink has finished.
    pub fn is_done(&self) -> bool {
        *self.done.borrow()
    }

    /// Name of the sink this completion belongs to
    pub fn node(&self) -> &str {
        &self.node
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("node", &self.node)
            .field("done", &self.is_done())
            .finish()
    }
}
