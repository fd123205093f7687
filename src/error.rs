//! Error types for graph construction and execution.

use thiserror::Error;

use crate::types::TypeDescriptor;

/// The main error type for building and running a stage graph.
///
/// Everything except [`Error::Disconnected`] and [`Error::StageFailure`] is a
/// configuration error: it is returned synchronously by the wiring or start
/// call that caused it, before any stage task has been spawned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A Source or Transform was started without any downstream receiver
    #[error("node `{node}` has no downstream receivers")]
    NoReceivers { node: String },

    /// An edge connects a producer and a consumer of different payload types
    #[error("cannot connect `{from}` to `{to}`: output type `{output}` does not match input type `{input}`")]
    TypeMismatch {
        from: String,
        to: String,
        output: TypeDescriptor,
        input: TypeDescriptor,
    },

    /// The node was already started, so it can no longer be wired or started again
    #[error("node `{node}` has already been started")]
    AlreadyStarted { node: String },

    /// `start` was called outside of a Tokio runtime
    #[error("no Tokio runtime available to launch node `{node}`")]
    NoRuntime { node: String },

    /// Every consumer fed by this node has gone away
    #[error("all receivers of node `{node}` have been dropped")]
    Disconnected { node: String },

    /// A stage task terminated without running to completion
    #[error("stage `{node}` terminated before completing")]
    StageFailure { node: String },
}

impl Error {
    /// Returns true for errors caused by assembling the graph incorrectly.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoReceivers { .. }
                | Error::TypeMismatch { .. }
                | Error::AlreadyStarted { .. }
                | Error::NoRuntime { .. }
        )
    }

    pub(crate) fn no_receivers(node: impl Into<String>) -> Self {
        Error::NoReceivers { node: node.into() }
    }

    pub(crate) fn already_started(node: impl Into<String>) -> Self {
        Error::AlreadyStarted { node: node.into() }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_configuration_errors() {
        assert!(Error::no_receivers("counter").is_configuration());
        assert!(Error::already_started("counter").is_configuration());
        assert!(Error::NoRuntime {
            node: "counter".into()
        }
        .is_configuration());
        assert!(!Error::Disconnected {
            node: "counter".into()
        }
        .is_configuration());
        assert!(!Error::StageFailure {
            node: "collector".into()
        }
        .is_configuration());
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let err = Error::TypeMismatch {
            from: "messager".into(),
            to: "odds".into(),
            output: TypeDescriptor::of::<String>(),
            input: TypeDescriptor::of::<i64>(),
        };
        let msg = err.to_string();
        assert!(msg.contains("messager"));
        assert!(msg.contains("alloc::string::String"));
        assert!(msg.contains("i64"));
    }
}
