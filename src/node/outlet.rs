use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::connect::joiner::Joiner;
use crate::error::{Error, Result};
use crate::lifecycle::Launch;
use crate::node::{NodeCore, NodeState};
use crate::types::TypeDescriptor;

/// A consumer as seen from the producer wired to it: where to send, and
/// what to start.
pub struct Outlet<T> {
    pub(crate) joiner: Arc<Joiner<T>>,
    pub(crate) node: Arc<dyn Launch>,
}

impl<T> Clone for Outlet<T> {
    fn clone(&self) -> Self {
        Self {
            joiner: Arc::clone(&self.joiner),
            node: Arc::clone(&self.node),
        }
    }
}

/// An [`Outlet`] with its payload type erased.
pub struct ErasedOutlet {
    pub(crate) input: TypeDescriptor,
    pub(crate) joiner: Arc<dyn Any + Send + Sync>,
    pub(crate) node: Arc<dyn Launch>,
}

impl ErasedOutlet {
    pub(crate) fn new<T: Send + 'static>(outlet: Outlet<T>) -> Self {
        Self {
            input: TypeDescriptor::of::<T>(),
            joiner: outlet.joiner,
            node: outlet.node,
        }
    }

    /// Recover the typed outlet, or hand the erased one back on mismatch.
    pub(crate) fn downcast<T: Send + 'static>(self) -> std::result::Result<Outlet<T>, Self> {
        let ErasedOutlet {
            input,
            joiner,
            node,
        } = self;
        match joiner.downcast::<Joiner<T>>() {
            Ok(joiner) => Ok(Outlet { joiner, node }),
            Err(joiner) => Err(ErasedOutlet {
                input,
                joiner,
                node,
            }),
        }
    }
}

/// The downstream edges of a Source or Transform.
pub(crate) struct Outlets<T> {
    list: Mutex<Vec<Outlet<T>>>,
}

impl<T: Send + 'static> Outlets<T> {
    pub(crate) fn new() -> Self {
        Self {
            list: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }

    pub(crate) fn joiners(&self) -> Vec<Arc<Joiner<T>>> {
        self.list
            .lock()
            .iter()
            .map(|outlet| Arc::clone(&outlet.joiner))
            .collect()
    }

    pub(crate) fn nodes(&self) -> Vec<Arc<dyn Launch>> {
        self.list
            .lock()
            .iter()
            .map(|outlet| Arc::clone(&outlet.node))
            .collect()
    }

    /// Wire `owner` to every outlet, or to none of them.
    ///
    /// The owner's state is checked under the edge lock. A starter claims
    /// the owner before reading [`Outlets::joiners`], so an edge is either
    /// rejected here or seen by the owner's outbox.
    pub(crate) fn connect(&self, owner: &NodeCore, outlets: Vec<Outlet<T>>) -> Result<()> {
        let mut list = self.list.lock();
        if owner.state() != NodeState::Unstarted {
            return Err(Error::already_started(owner.name()));
        }
        if let Some(started) = outlets
            .iter()
            .find(|outlet| outlet.node.state() != NodeState::Unstarted)
        {
            return Err(Error::already_started(started.node.name()));
        }

        for outlet in outlets {
            outlet.joiner.register();
            tracing::debug!(
                from = %owner.name(),
                to = %outlet.node.name(),
                capacity = outlet.joiner.capacity(),
                "wired"
            );
            list.push(outlet);
        }
        Ok(())
    }

    /// Type-check erased outlets against `T`, then wire them all.
    pub(crate) fn connect_erased(&self, owner: &NodeCore, erased: Vec<ErasedOutlet>) -> Result<()> {
        let output = TypeDescriptor::of::<T>();
        let mut outlets = Vec::with_capacity(erased.len());
        for outlet in erased {
            let input = outlet.input;
            let to = outlet.node.name().to_string();
            match outlet.downcast::<T>() {
                Ok(outlet) => outlets.push(outlet),
                Err(_) => {
                    return Err(Error::TypeMismatch {
                        from: owner.name().to_string(),
                        to,
                        output,
                        input,
                    })
                }
            }
        }
        self.connect(owner, outlets)
    }
}
