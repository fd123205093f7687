//! Fan-in and fan-out connectors between nodes.

pub(crate) mod forker;
pub(crate) mod joiner;

pub use forker::Outbox;
pub use joiner::Inbox;
