use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::NodeConfig;
use crate::connect::Outbox;
use crate::error::{Error, Result};
use crate::lifecycle::{self, Plan};
use crate::node::{NodeCore, NodeId, NodeState, Outlets};
use crate::traits::{AnyConsumer, Consumer, Producer};
use crate::types::TypeDescriptor;

type SourceFn<OUT> = Box<dyn FnOnce(CancellationToken, Outbox<OUT>) -> BoxFuture<'static, ()> + Send>;

/// Entry point of a graph: a node with no input that brings data in.
///
/// A source must be wired to at least one receiver and then started with
/// [`Source::start`]. Starting it launches everything reachable from it.
///
/// # Examples
///
/// ```rust
/// use pipeweld::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let numbers = Source::new(|out: Outbox<u32>| async move {
///     for n in 1..=3 {
///         if out.send(n).await.is_err() {
///             break;
///         }
///     }
/// });
/// let printer = Sink::new(|mut input: Inbox<u32>| async move {
///     while let Some(n) = input.recv().await {
///         println!("{n}");
///     }
/// });
///
/// numbers.sends_to(&[&printer])?;
/// numbers.start()?;
/// printer.done().wait().await?;
/// # Ok(())
/// # }
/// ```
pub struct Source<OUT> {
    inner: Arc<SourceNode<OUT>>,
}

struct SourceNode<OUT> {
    core: NodeCore,
    outlets: Outlets<OUT>,
    fun: Mutex<Option<SourceFn<OUT>>>,
}

impl<OUT> Clone for Source<OUT> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<OUT> Source<OUT>
where
    OUT: Clone + Send + 'static,
{
    /// Wrap a function that writes to the source's output.
    pub fn new<F, Fut>(fun: F) -> Self
    where
        F: FnOnce(Outbox<OUT>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_config(fun, NodeConfig::default())
    }

    /// Wrap a function with an explicit configuration.
    ///
    /// Sources own no input, so only the name is used.
    pub fn with_config<F, Fut>(fun: F, config: NodeConfig) -> Self
    where
        F: FnOnce(Outbox<OUT>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::cancellable_with_config(move |_token, out| fun(out), config)
    }

    /// Wrap a function that also observes a cancellation token.
    ///
    /// The token is the one passed to [`Source::start_with_cancellation`].
    /// The function is expected to return once it is cancelled; shutdown then
    /// propagates downstream as inputs close.
    pub fn cancellable<F, Fut>(fun: F) -> Self
    where
        F: FnOnce(CancellationToken, Outbox<OUT>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::cancellable_with_config(fun, NodeConfig::default())
    }

    pub fn cancellable_with_config<F, Fut>(fun: F, config: NodeConfig) -> Self
    where
        F: FnOnce(CancellationToken, Outbox<OUT>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let fun: SourceFn<OUT> = Box::new(move |token: CancellationToken, out: Outbox<OUT>| {
            fun(token, out).boxed()
        });
        Self {
            inner: Arc::new(SourceNode {
                core: NodeCore::new("source", config.name),
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

    /// Start the source and every node reachable from it.
    pub fn start(&self) -> Result<()> {
        self.start_with_cancellation(CancellationToken::new())
    }

    /// Start the source, handing `token` to a cancellable source function.
    ///
    /// Every reachable consumer is launched before the source itself, and
    /// nodes already started through another source are left alone. All
    /// configuration errors are reported before any task is spawned.
    pub fn start_with_cancellation(&self, token: CancellationToken) -> Result<()> {
        let node = &self.inner;
        let name = node.core.name();
        let runtime = lifecycle::runtime_for(name)?;

        if node.core.state() != NodeState::Unstarted {
            return Err(Error::already_started(name));
        }
        if node.outlets.is_empty() {
            return Err(Error::no_receivers(name));
        }

        let plan = Plan::downstream_of(node.outlets.nodes())?;
        let planned = plan.len();
        let launched = plan.launch(&runtime);
        tracing::debug!(node = %name, planned, launched, "launched downstream");

        if !node.core.claim() {
            return Err(Error::already_started(name));
        }
        let Some(fun) = node.fun.lock().take() else {
            return Err(Error::already_started(name));
        };
        let outbox = Outbox::fork(name, &node.outlets.joiners());
        tracing::debug!(node = %name, receivers = outbox.receivers(), "starting source");

        let task_node = Arc::clone(node);
        runtime.spawn(async move {
            fun(token, outbox).await;
            task_node.core.finish();
        });
        Ok(())
    }
}

impl<OUT> Producer<OUT> for Source<OUT>
where
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

impl<OUT> std::fmt::Debug for Source<OUT> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("id", &self.inner.core.id())
            .field("name", &self.inner.core.name())
            .field("state", &self.inner.core.state())
            .finish()
    }
}
