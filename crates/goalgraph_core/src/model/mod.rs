//! Domain model for the goal/task tracker graph.
//!
//! # Responsibility
//! - Define entity snapshots, kinds, identifiers and sparse update payloads.
//! - Keep row decoding next to the shapes it produces.
//!
//! # Invariants
//! - Every entity is identified by a store-generated positive `EntityId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod entity;
pub mod kind;
pub mod patch;
