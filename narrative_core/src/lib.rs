//! # Narrative Core (Ravi)
//!
//! The engine of the narrative state-space system. This crate takes the
//! world declared with `world_model`, explores every state its choices can
//! reach, and answers structural questions about the resulting narrative
//! space.
//!
//! ## Core Components
//!
//! - **generator**: Exhaustive, depth-bounded exploration into a deduplicated graph
//! - **narrative_graph**: The state graph, the generated model, and its set types
//! - **events**: Concrete choice applications and the paths they form
//! - **query**: Projections, filters, sub-models and path enumeration
//! - **assertions**: Named checks over a model with ordered PASS/FAIL reports
//! - **layout**: Location maps inferred from a model and a choice tagging
//!
//! ## Design Philosophy
//!
//! - **Value-Driven**: States are immutable values; equal values are the same node however they were reached
//! - **Read-Only Results**: A model never changes after generation; counterfactuals run a new generation pass
//! - **Informative, Not Fatal**: Dead ends and failed assertions are data for the author, not errors

pub mod assertions;
pub mod error;
pub mod events;
pub mod generator;
pub mod layout;
pub mod narrative_graph;
pub mod query;

pub use assertions::*;
pub use error::{NarrativeError, Result};
pub use events::*;
pub use generator::*;
pub use layout::*;
pub use narrative_graph::*;
pub use query::*;
