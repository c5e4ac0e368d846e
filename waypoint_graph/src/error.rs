use std::{error, fmt};

use crate::{ElementID, NodeIndex};

/// Structural problems with a graph handed to `Graph::new`. These are fatal: a graph with any of
/// them is rejected instead of being partially used.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphError {
    /// An edge refers to a node position that doesn't exist.
    DanglingEdge {
        edge: usize,
        node: NodeIndex,
        num_nodes: usize,
    },
    /// A node's recorded index disagrees with its position in the array.
    IndexMismatch { position: usize, index: NodeIndex },
    /// Lanes must have some width.
    BadLaneWidth { id: ElementID, width: f64 },
    DuplicateID { id: ElementID },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphError::DanglingEdge {
                edge,
                node,
                num_nodes,
            } => write!(
                f,
                "edge #{} refers to {}, but there are only {} nodes",
                edge, node, num_nodes
            ),
            GraphError::IndexMismatch { position, index } => {
                write!(f, "node at position {} claims to be {}", position, index)
            }
            GraphError::BadLaneWidth { id, width } => {
                write!(f, "way-point {} has lane width {}", id, width)
            }
            GraphError::DuplicateID { id } => write!(f, "way-point {} appears twice", id),
        }
    }
}

impl error::Error for GraphError {}
