//! Wiring traits.
//!
//! [`Producer`] is implemented by nodes with an output (Source, Transform) and
//! [`Consumer`] by nodes with an input (Transform, Sink). Typed wiring through
//! [`Producer::sends_to`] is checked by the compiler: the producer's output
//! type must be the consumer's input type. [`AnyConsumer`] erases the payload
//! type so heterogeneous receivers can be collected and wired at run time,
//! with the type check moved to [`Producer::sends_to_any`].

use crate::error::Result;
use crate::node::{ErasedOutlet, Outlet};
use crate::types::TypeDescriptor;

/// A node that sends `OUT` items downstream.
///
/// # Examples
///
/// ```rust
/// use pipeweld::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let words = Source::new(|out: Outbox<String>| async move {
///     let _ = out.send("hello".to_string()).await;
/// });
/// let upper = Transform::new(|mut input: Inbox<String>, out: Outbox<String>| async move {
///     while let Some(word) = input.recv().await {
///         let _ = out.send(word.to_uppercase()).await;
///     }
/// });
/// let lengths = Transform::new(|mut input: Inbox<String>, out: Outbox<usize>| async move {
///     while let Some(word) = input.recv().await {
///         let _ = out.send(word.len()).await;
///     }
/// });
/// let printer = Sink::new(|mut input: Inbox<usize>| async move {
///     while let Some(len) = input.recv().await {
///         println!("{len}");
///     }
/// });
///
/// words.sends_to(&[&upper, &lengths])?;
/// upper.sends_to(&[&lengths])?;
/// lengths.sends_to(&[&printer])?;
///
/// words.start()?;
/// printer.done().wait().await?;
/// # Ok(())
/// # }
/// ```
///
/// Edges between mismatched payload types are rejected by the compiler:
///
/// ```compile_fail
/// use pipeweld::prelude::*;
///
/// let words = Source::new(|out: Outbox<String>| async move {
///     let _ = out.send("hello".to_string()).await;
/// });
/// let printer = Sink::new(|_input: Inbox<usize>| async {});
/// words.sends_to(&[&printer]).unwrap();
/// ```
pub trait Producer<OUT> {
    /// Connect this node's output to each of `receivers`.
    ///
    /// Each call adds edges; a receiver listed twice gets every item twice.
    /// Fails with [`Error::AlreadyStarted`](crate::Error::AlreadyStarted) if
    /// this node or any receiver is already running; in that case no edge is
    /// added.
    fn sends_to(&self, receivers: &[&dyn Consumer<OUT>]) -> Result<()>;

    /// Connect to type-erased receivers, checking payload types at run time.
    ///
    /// Fails with [`Error::TypeMismatch`](crate::Error::TypeMismatch) on the
    /// first receiver whose input type differs from `OUT`; in that case no
    /// edge is added.
    fn sends_to_any(&self, receivers: &[&dyn AnyConsumer]) -> Result<()>;

    /// Payload type of this node's output
    fn output_type(&self) -> TypeDescriptor;
}

/// A node that receives `IN` items from upstream.
///
/// Implemented by [`Transform`](crate::Transform) and [`Sink`](crate::Sink).
pub trait Consumer<IN> {
    /// Payload type of this node's input
    fn input_type(&self) -> TypeDescriptor;

    #[doc(hidden)]
    fn outlet(&self) -> Outlet<IN>;
}

/// A consumer whose payload type is only known at run time.
pub trait AnyConsumer {
    /// Payload type of this node's input
    fn input_type(&self) -> TypeDescriptor;

    #[doc(hidden)]
    fn erased_outlet(&self) -> ErasedOutlet;
}
