//! Lazy field resolution over the entity graph.
//!
//! # Responsibility
//! - Resolve parent references, child collections, tags and notes on demand.
//! - Expand an entity into exactly the fields a caller selected.
//!
//! # Invariants
//! - Resolvers share no state; they may run sequentially or concurrently.
//!
//! # See also
//! - `association` for the tag and note storage mapping.

pub mod fields;
pub mod graph;
pub mod resolver;

pub use fields::{parse_selection, ContextField, GoalField, ProjectField, TagField, TaskField};
pub use graph::{ContextGraph, Expanded, GoalGraph, ProjectGraph, TagGraph, TaskGraph};
pub use resolver::FieldResolver;
