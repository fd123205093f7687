//! Per-node configuration.

/// Configuration applied when a node is constructed.
///
/// `buffer_capacity` only matters for nodes that own an input (Transforms and
/// Sinks). The default of zero makes every edge into the node a rendezvous:
/// a producer's send waits until the node is ready to receive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Number of items the node's input queue holds before senders block
    pub buffer_capacity: usize,
    /// Name used in logs and errors; defaults to `<kind>#<id>`
    pub name: Option<String>,
}

impl NodeConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input buffer capacity
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the diagnostic name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
