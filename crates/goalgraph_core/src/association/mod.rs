//! Polymorphic tag and note associations.
//!
//! # Responsibility
//! - Resolve entity kinds to association storage (`registry`).
//! - Run assign/remove/list operations against that storage (`resolver`).
//!
//! # Invariants
//! - Only `project`, `goal` and `task` carry tags and notes.

pub mod registry;
pub mod resolver;

pub use registry::{descriptor, resolve, AssociationFamily, StorageDescriptor};
pub use resolver::{AssociationResolver, TagAssignment};
