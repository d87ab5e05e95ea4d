//! Repository layer over the relational store.
//!
//! # Responsibility
//! - Provide the single-table write surface used to populate the graph.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   store transport errors.

pub mod entity_repo;
