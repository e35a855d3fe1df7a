//! Narrative graph - the deduplicated state graph and the model built on it.
//!
//! The graph consists of:
//! - **Nodes**: distinct [`State`](world_model::State) values
//! - **Edges**: directed connections labelled with the set of choices that justify them
//! - **Events**: every individual `(pre, post, choice)` application

mod graph;
mod model;
mod sets;

pub use graph::*;
pub use model::*;
pub use sets::*;
