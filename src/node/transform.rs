use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::config::NodeConfig;
use crate::connect::joiner::Joiner;
use crate::connect::{Inbox, Outbox};
use crate::error::Result;
use crate::lifecycle::Launch;
use crate::node::{ErasedOutlet, NodeCore, NodeId, NodeState, Outlet, Outlets};
use crate::traits::{AnyConsumer, Consumer, Producer};
use crate::types::TypeDescriptor;

type TransformFn<IN, OUT> = Box<dyn FnOnce(Inbox<IN>, Outbox<OUT>) -> BoxFuture<'static, ()> + Send>;

/// An intermediate node: reads the merged input of every upstream producer,
/// and broadcasts what it writes to every downstream receiver.
///
/// The function should keep reading until [`Inbox::recv`] returns `None`.
///
/// ```rust
/// use pipeweld::prelude::*;
///
/// let odds = Transform::new(|mut input: Inbox<i64>, out: Outbox<i64>| async move {
///     while let Some(n) = input.recv().await {
///         if n % 2 == 1 && out.send(n).await.is_err() {
///             break;
///         }
///     }
/// });
/// assert!(odds.input_type().is::<i64>());
/// ```
pub struct Transform<IN, OUT> {
    inner: Arc<TransformNode<IN, OUT>>,
}

struct TransformNode<IN, OUT> {
    core: NodeCore,
    joiner: Arc<Joiner<IN>>,
    outlets: Outlets<OUT>,
    fun: Mutex<Option<TransformFn<IN, OUT>>>,
}

impl<IN, OUT> Clone for Transform<IN, OUT> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<IN, OUT> Transform<IN, OUT>
where
    IN: Send + 'static,
    OUT: Clone + Send + 'static,
{
    /// Wrap a function with an unbuffered input.
    pub fn new<F, Fut>(fun: F) -> Self
    where
        F: FnOnce(Inbox<IN>, Outbox<OUT>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_config(fun, NodeConfig::default())
    }

    /// Wrap a function, sizing its input buffer from `config`.
    pub fn with_config<F, Fut>(fun: F, config: NodeConfig) -> Self
    where
        F: FnOnce(Inbox<IN>, Outbox<OUT>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let fun: TransformFn<IN, OUT> =
            Box::new(move |input: Inbox<IN>, out: Outbox<OUT>| fun(input, out).boxed());
        let core = NodeCore::new("transform", config.name);
        let joiner = Arc::new(Joiner::new(core.name(), config.buffer_capacity));
        Self {
            inner: Arc::new(TransformNode {
                core,
                joiner,
                outlets: Outlets::new(),
                fun: Mutex::new(Some(fun)),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.core.id()
    }

    pub fn name(&self) -> &str {
        self.inner.core.name()
    }

    pub fn state(&self) -> NodeState {
        self.inner.core.state()
    }

    /// Number of wired receivers
    pub fn receivers(&self) -> usize {
        self.inner.outlets.len()
    }

    /// Number of upstream edges whose producer has not finished yet
    pub fn open_inputs(&self) -> usize {
        self.inner.joiner.open_feeds()
    }

    /// Payload type this node accepts
    pub fn input_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<IN>()
    }

    /// Payload type this node emits
    pub fn output_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<OUT>()
    }
}

impl<IN, OUT> Launch for TransformNode<IN, OUT>
where
    IN: Send + 'static,
    OUT: Clone + Send + 'static,
{
    fn id(&self) -> NodeId {
        self.core.id()
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn state(&self) -> NodeState {
        self.core.state()
    }

    fn downstream(&self) -> Vec<Arc<dyn Launch>> {
        self.outlets.nodes()
    }

    fn has_receivers(&self) -> bool {
        !self.outlets.is_empty()
    }

    fn launch(self: Arc<Self>, runtime: &Handle) -> bool {
        if !self.core.claim() {
            return false;
        }
        let (Some(fun), Some(input)) = (self.fun.lock().take(), self.joiner.inbox()) else {
            return false;
        };
        let out = Outbox::fork(self.core.name(), &self.outlets.joiners());
        tracing::debug!(
            node = %self.core.name(),
            receivers = out.receivers(),
            capacity = input.capacity(),
            "starting transform"
        );

        runtime.spawn(async move {
            fun(input, out).await;
            self.core.finish();
        });
        true
    }
}

impl<IN, OUT> Producer<OUT> for Transform<IN, OUT>
where
    IN: Send + 'static,
    OUT: Clone + Send + 'static,
{
    fn sends_to(&self, receivers: &[&dyn Consumer<OUT>]) -> Result<()> {
        let outlets = receivers.iter().map(|receiver| receiver.outlet()).collect();
        self.inner.outlets.connect(&self.inner.core, outlets)
    }

    fn sends_to_any(&self, receivers: &[&dyn AnyConsumer]) -> Result<()> {
        let outlets = receivers
            .iter()
            .map(|receiver| receiver.erased_outlet())
            .collect();
        self.inner.outlets.connect_erased(&self.inner.core, outlets)
    }

    fn output_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<OUT>()
    }
}

impl<IN, OUT> Consumer<IN> for Transform<IN, OUT>
where
    IN: Send + 'static,
    OUT: Clone + Send + 'static,
{
    fn input_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<IN>()
    }

    fn outlet(&self) -> Outlet<IN> {
        Outlet {
            joiner: Arc::clone(&self.inner.joiner),
            node: self.inner.clone(),
        }
    }
}

impl<IN, OUT> AnyConsumer for Transform<IN, OUT>
where
    IN: Send + 'static,
    OUT: Clone + Send + 'static,
{
    fn input_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<IN>()
    }

    fn erased_outlet(&self) -> ErasedOutlet {
        ErasedOutlet::new(Consumer::outlet(self))
    }
}

impl<IN, OUT> std::fmt::Debug for Transform<IN, OUT> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("id", &self.inner.core.id())
            .field("name", &self.inner.core.name())
            .field("state", &self.inner.core.state())
            .field("capacity", &self.inner.joiner.capacity())
            .finish()
    }
}
