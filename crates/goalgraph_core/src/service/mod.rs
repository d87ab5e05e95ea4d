//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate association, resolution and update calls into use-case APIs.
//! - Keep transport layers decoupled from storage details.

pub mod tracker_service;
