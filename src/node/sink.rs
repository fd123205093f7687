use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::config::NodeConfig;
use crate::connect::joiner::Joiner;
use crate::connect::Inbox;
use crate::lifecycle::{self, Completion, CompletionSignal, Launch};
use crate::node::{ErasedOutlet, NodeCore, NodeId, NodeState, Outlet};
use crate::traits::{AnyConsumer, Consumer};
use crate::types::TypeDescriptor;

type SinkFn<IN> = Box<dyn FnOnce(Inbox<IN>) -> BoxFuture<'static, ()> + Send>;

/// Terminal node: consumes its merged input and produces nothing.
///
/// When the function returns, which it should do once its input is closed
/// and drained, the sink's [`Completion`] fires. Awaiting the completion of
/// every sink is how a caller waits for the whole graph to drain.
pub struct Sink<IN> {
    inner: Arc<SinkNode<IN>>,
}

struct SinkNode<IN> {
    core: NodeCore,
    joiner: Arc<Joiner<IN>>,
    fun: Mutex<Option<SinkFn<IN>>>,
    signal: Mutex<Option<CompletionSignal>>,
    done: Completion,
}

impl<IN> Clone for Sink<IN> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<IN> Sink<IN>
where
    IN: Send + 'static,
{
    /// Wrap a function with an unbuffered input.
    pub fn new<F, Fut>(fun: F) -> Self
    where
        F: FnOnce(Inbox<IN>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_config(fun, NodeConfig::default())
    }

    /// Wrap a function, sizing its input buffer from `config`.
    pub fn with_config<F, Fut>(fun: F, config: NodeConfig) -> Self
    where
        F: FnOnce(Inbox<IN>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let fun: SinkFn<IN> = Box::new(move |input: Inbox<IN>| fun(input).boxed());
        let core = NodeCore::new("sink", config.name);
        let joiner = Arc::new(Joiner::new(core.name(), config.buffer_capacity));
        let (signal, done) = lifecycle::completion(core.name());
        Self {
            inner: Arc::new(SinkNode {
                core,
                joiner,
                fun: Mutex::new(Some(fun)),
                signal: Mutex::new(Some(signal)),
                done,
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

    /// Number of upstream edges whose producer has not finished yet
    pub fn open_inputs(&self) -> usize {
        self.inner.joiner.open_feeds()
    }

    /// Payload type this node accepts
    pub fn input_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<IN>()
    }

    /// Completion handle for this sink.
    pub fn done(&self) -> Completion {
        self.inner.done.clone()
    }
}

impl<IN> Launch for SinkNode<IN>
where
    IN: Send + 'static,
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
        Vec::new()
    }

    fn has_receivers(&self) -> bool {
        true
    }

    fn launch(self: Arc<Self>, runtime: &Handle) -> bool {
        if !self.core.claim() {
            return false;
        }
        let (Some(fun), Some(input), Some(signal)) = (
            self.fun.lock().take(),
            self.joiner.inbox(),
            self.signal.lock().take(),
        ) else {
            return false;
        };
        tracing::debug!(node = %self.core.name(), capacity = input.capacity(), "starting sink");
        let signal = signal.arm();

        runtime.spawn(async move {
            fun(input).await;
            self.core.finish();
            signal.fire();
        });
        true
    }
}

impl<IN> Consumer<IN> for Sink<IN>
where
    IN: Send + 'static,
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

impl<IN> AnyConsumer for Sink<IN>
where
    IN: Send + 'static,
{
    fn input_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<IN>()
    }

    fn erased_outlet(&self) -> ErasedOutlet {
        ErasedOutlet::new(Consumer::outlet(self))
    }
}

impl<IN> std::fmt::Debug for Sink<IN> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("id", &self.inner.core.id())
            .field("name", &self.inner.core.name())
            .field("state", &self.inner.core.state())
            .field("done", &self.inner.done.is_done())
            .finish()
    }
}
