//! Core storage trait for diagram graphs
//!
//! This trait defines the interface for storing nodes and the edges between
//! them. Every lookup returns `Option`: a missing id is an absence, not an
//! error.

/// Core trait for diagram graph storage
///
/// The associated types let an implementation pick its own node and edge
/// structures along with the stable identifiers used to address them.
pub trait GraphStore {
    /// The node data type for this store
    type Node;

    /// The edge data type for this store
    type Edge;

    /// Identifier assigned to stored nodes
    type NodeId: Copy + Eq;

    /// Identifier assigned to stored edges
    type EdgeId: Copy + Eq;

    /// Why an edge was refused
    type Error;

    /// Add a node to the store
    fn add_node(&mut self, node: Self::Node) -> Self::NodeId;

    /// Remove a node, along with any edge that would dangle without it
    fn remove_node(&mut self, id: Self::NodeId) -> Option<Self::Node>;

    /// Add an edge to the store; both ends must resolve
    fn add_edge(&mut self, edge: Self::Edge) -> Result<Self::EdgeId, Self::Error>;

    /// Remove an edge
    fn remove_edge(&mut self, id: Self::EdgeId) -> Option<Self::Edge>;

    /// Get a node by ID
    fn get_node(&self, id: Self::NodeId) -> Option<&Self::Node>;

    /// Get an edge by ID
    fn get_edge(&self, id: Self::EdgeId) -> Option<&Self::Edge>;

    /// Iterate over all nodes
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the store
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;
}
