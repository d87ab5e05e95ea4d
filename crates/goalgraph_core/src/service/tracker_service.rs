//! Tracker use-case service.
//!
//! # Responsibility
//! - Accept transport-shaped input (string kinds, ids and field names).
//! - Validate all of it, then delegate to association, resolution and update
//!   components.
//!
//! # Invariants
//! - Malformed kinds, ids and field names are rejected before any round trip.
//! - The service layer holds no state besides its store handle.

use crate::association::{AssociationResolver, TagAssignment};
use crate::context::RequestContext;
use crate::error::CoreResult;
use crate::model::entity::{Context, Goal, Note, Project, Tag, Task};
use crate::model::kind::{EntityId, EntityKind};
use crate::model::patch::SparsePatch;
use crate::repo::entity_repo::EntityRepository;
use crate::resolve::{
    parse_selection, ContextField, ContextGraph, FieldResolver, GoalField, GoalGraph,
    ProjectField, ProjectGraph, TagField, TagGraph, TaskField, TaskGraph,
};
use crate::store::RelationalStore;
use crate::update::UpdateComposer;

/// Use-case entry points over one store.
pub struct TrackerService<S: RelationalStore> {
    store: S,
}

impl<S: RelationalStore> TrackerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn repository(&self) -> EntityRepository<'_, S> {
        EntityRepository::new(&self.store)
    }

    pub fn assign_tag(
        &self,
        ctx: &RequestContext,
        kind: &str,
        entity_id: &str,
        tag_id: &str,
    ) -> CoreResult<TagAssignment> {
        let kind: EntityKind = kind.parse()?;
        let (entity_id, tag_id) = (entity_id.parse()?, tag_id.parse()?);
        AssociationResolver::new(&self.store).assign(ctx, kind, entity_id, tag_id)
    }

    pub fn remove_tag(
        &self,
        ctx: &RequestContext,
        kind: &str,
        entity_id: &str,
        tag_id: &str,
    ) -> CoreResult<()> {
        let kind: EntityKind = kind.parse()?;
        let (entity_id, tag_id) = (entity_id.parse()?, tag_id.parse()?);
        AssociationResolver::new(&self.store)
            .remove(ctx, kind, entity_id, tag_id)
            .map(|_| ())
    }

    pub fn tags_for(
        &self,
        ctx: &RequestContext,
        kind: &str,
        entity_id: &str,
    ) -> CoreResult<Vec<Tag>> {
        let kind: EntityKind = kind.parse()?;
        let entity_id: EntityId = entity_id.parse()?;
        AssociationResolver::new(&self.store).list_tags_for(ctx, kind, entity_id)
    }

    pub fn notes_for(
        &self,
        ctx: &RequestContext,
        kind: &str,
        entity_id: &str,
    ) -> CoreResult<Vec<Note>> {
        let kind: EntityKind = kind.parse()?;
        let entity_id: EntityId = entity_id.parse()?;
        AssociationResolver::new(&self.store).list_notes_for(ctx, kind, entity_id)
    }

    pub fn attach_note(
        &self,
        ctx: &RequestContext,
        kind: &str,
        entity_id: &str,
        title: &str,
        content: &str,
    ) -> CoreResult<Note> {
        let kind: EntityKind = kind.parse()?;
        let entity_id: EntityId = entity_id.parse()?;
        AssociationResolver::new(&self.store).attach_note(ctx, kind, entity_id, title, content)
    }

    /// Loads a goal and expands the selected fields.
    pub fn goal(&self, ctx: &RequestContext, id: &str, fields: &[&str]) -> CoreResult<GoalGraph> {
        let id: EntityId = id.parse()?;
        let selection = parse_selection::<GoalField, _>(fields)?;
        let goal = self.repository().get::<Goal>(ctx, id)?;
        FieldResolver::new(&self.store).expand_goal(ctx, goal, &selection)
    }

    pub fn project(
        &self,
        ctx: &RequestContext,
        id: &str,
        fields: &[&str],
    ) -> CoreResult<ProjectGraph> {
        let id: EntityId = id.parse()?;
        let selection = parse_selection::<ProjectField, _>(fields)?;
        let project = self.repository().get::<Project>(ctx, id)?;
        FieldResolver::new(&self.store).expand_project(ctx, project, &selection)
    }

    pub fn task(&self, ctx: &RequestContext, id: &str, fields: &[&str]) -> CoreResult<TaskGraph> {
        let id: EntityId = id.parse()?;
        let selection = parse_selection::<TaskField, _>(fields)?;
        let task = self.repository().get::<Task>(ctx, id)?;
        FieldResolver::new(&self.store).expand_task(ctx, task, &selection)
    }

    /// Loads a context (flow) and expands the selected fields.
    pub fn context(
        &self,
        ctx: &RequestContext,
        id: &str,
        fields: &[&str],
    ) -> CoreResult<ContextGraph> {
        let id: EntityId = id.parse()?;
        let selection = parse_selection::<ContextField, _>(fields)?;
        let context = self.repository().get::<Context>(ctx, id)?;
        FieldResolver::new(&self.store).expand_context(ctx, context, &selection)
    }

    pub fn tag(&self, ctx: &RequestContext, id: &str, fields: &[&str]) -> CoreResult<TagGraph> {
        let id: EntityId = id.parse()?;
        let selection = parse_selection::<TagField, _>(fields)?;
        let tag = self.repository().get::<Tag>(ctx, id)?;
        FieldResolver::new(&self.store).expand_tag(ctx, tag, &selection)
    }

    /// Applies a sparse patch to the row `id` of the patch's table.
    pub fn update<P: SparsePatch>(
        &self,
        ctx: &RequestContext,
        id: &str,
        patch: &P,
    ) -> CoreResult<P::Output> {
        let id: EntityId = id.parse()?;
        UpdateComposer::new(&self.store).apply(ctx, id, patch)
    }
}
