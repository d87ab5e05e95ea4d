//! Core entity-relationship resolution for the goal/task tracker.
//! This crate is the single source of truth for association and field
//! resolution invariants; transports sit on top of `TrackerService`.

pub mod association;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod resolve;
pub mod service;
pub mod store;
pub mod update;

pub use association::{AssociationFamily, AssociationResolver, StorageDescriptor, TagAssignment};
pub use config::{ConfigError, StoreConfig};
pub use context::{CancellationHandle, RequestContext};
pub use db::{open_pool, open_pool_at, DbError, DbPool, DbResult};
pub use error::{CoreError, CoreResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::entity::{Annotatable, Context, Goal, Note, Project, Record, Tag, Task, Workspace};
pub use model::kind::{AsEntityKind, EntityId, EntityKind};
pub use model::patch::{
    ContextPatch, FieldPatch, GoalPatch, NotePatch, ProjectPatch, SparsePatch, TagPatch, TaskPatch,
};
pub use repo::entity_repo::{
    EntityRepository, NewContext, NewGoal, NewProject, NewRecord, NewTag, NewTask, NewWorkspace,
};
pub use resolve::{
    parse_selection, ContextField, ContextGraph, Expanded, FieldResolver, GoalField, GoalGraph,
    ProjectField, ProjectGraph, TagField, TagGraph, TaskField, TaskGraph,
};
pub use service::tracker_service::TrackerService;
pub use store::{RelationalStore, SqliteStore, StoreError, StoreResult, StoreRow};
pub use update::{compose, UpdateComposer, UpdateStatement};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
