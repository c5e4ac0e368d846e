//! The route network a lane model is built from: way-points joined by directed lane edges.
//!
//! An external parser produces the nodes and edges. `Graph::new` validates them, then the caller
//! establishes a local planar frame and optionally infers lane-change edges:
//!
//! ```ignore
//! let mut graph = Graph::new(nodes, edges)?;
//! graph.establish_frame();
//! graph.find_implicit_edges();
//! ```

#[macro_use]
extern crate log;

mod error;
mod frame;
mod graph;
mod ids;
mod implicit;
pub mod snapshot;
mod types;

pub use crate::error::GraphError;
pub use crate::frame::{Frame, UTM_GRID_SIZE};
pub use crate::graph::Graph;
pub use crate::ids::{ElementID, LaneID, NodeIndex};
pub use crate::types::{Boundary, WayPointEdge, WayPointNode};
