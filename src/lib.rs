//! # Typed stage graphs over async channels
//!
//! This crate turns plain async functions into nodes of a directed graph of
//! concurrently running stages, and does the fan-in/fan-out plumbing and the
//! lifecycle bookkeeping for you.
//!
//! ## Core Concepts
//!
//! - **Source**: brings data into the graph; writes to an [`Outbox`]
//! - **Transform**: reads an [`Inbox`], writes an [`Outbox`]
//! - **Sink**: reads an [`Inbox`]; fires a [`Completion`] when it returns
//! - **Fan-out**: everything written to an outbox reaches every receiver
//! - **Fan-in**: an inbox merges every upstream producer and closes only once
//!   all of them have finished
//!
//! Edges are type-checked when the graph is built. Starting a source launches
//! every node reachable from it, each as its own Tokio task, consumers first.
//!
//! ## Example
//!
//! ```rust
//! use pipeweld::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let numbers = Source::new(|out: Outbox<i64>| async move {
//!         for n in 1..=10 {
//!             if out.send(n).await.is_err() {
//!                 break;
//!             }
//!         }
//!     });
//!     let doubler = Transform::with_config(
//!         |mut input: Inbox<i64>, out: Outbox<i64>| async move {
//!             while let Some(n) = input.recv().await {
//!                 let _ = out.send(n * 2).await;
//!             }
//!         },
//!         NodeConfig::new().buffer_capacity(10),
//!     );
//!     let printer = Sink::new(|mut input: Inbox<i64>| async move {
//!         while let Some(n) = input.recv().await {
//!             println!("{n}");
//!         }
//!     });
//!
//!     numbers.sends_to(&[&doubler])?;
//!     doubler.sends_to(&[&printer])?;
//!     numbers.start()?;
//!
//!     printer.done().wait().await
//! }
//! ```

pub mod config;
pub mod connect;
pub mod error;
pub mod lifecycle;
pub mod traits;
pub mod types;

mod node;

// Re-export commonly used items
pub mod prelude {
    pub use crate::config::NodeConfig;
    pub use crate::connect::{Inbox, Outbox};
    pub use crate::error::{Error, Result};
    pub use crate::lifecycle::Completion;
    pub use crate::node::{NodeId, NodeState, Sink, Source, Transform};
    pub use crate::traits::{AnyConsumer, Consumer, Producer};
    pub use crate::types::TypeDescriptor;
    pub use tokio_util::sync::CancellationToken;
}

pub use config::NodeConfig;
pub use connect::{Inbox, Outbox};
pub use error::{Error, Result};
pub use lifecycle::Completion;
pub use node::{NodeId, NodeState, Sink, Source, Transform};
pub use traits::{AnyConsumer, Consumer, Producer};
pub use types::TypeDescriptor;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
