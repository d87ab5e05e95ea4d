//! Per-field lazy resolvers.
//!
//! # Responsibility
//! - Resolve one field of one entity with exactly one store round trip.
//! - Apply the fixed ordering contract of every collection field.
//!
//! # Invariants
//! - A null foreign key resolves to `None` without touching the store.
//! - A dangling foreign key resolves to `None`; it is not an error.
//! - Collections resolve to an empty `Vec`, never to `None`.
//! - No joins across fields and no batching: each field is its own query.

use crate::association::AssociationResolver;
use crate::context::RequestContext;
use crate::error::CoreResult;
use crate::model::entity::{
    Annotatable, Context, Goal, Note, Project, Record, Tag, Task, Workspace,
};
use crate::model::kind::EntityId;
use crate::store::RelationalStore;
use log::debug;
use rusqlite::types::Value;

/// Most urgent first; undated after dated; id breaks remaining ties.
const URGENCY_ORDER: &str = "priority DESC, due_date IS NULL, due_date ASC, id ASC";
const NEWEST_FIRST: &str = "created_at DESC, id DESC";
const OLDEST_FIRST: &str = "created_at ASC, id ASC";
const BY_NAME: &str = "name ASC, id ASC";

/// Field resolvers bound to one store.
pub struct FieldResolver<'s, S: RelationalStore + ?Sized> {
    store: &'s S,
    associations: AssociationResolver<'s, S>,
}

impl<'s, S: RelationalStore + ?Sized> FieldResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            associations: AssociationResolver::new(store),
        }
    }

    pub fn goal_project(&self, ctx: &RequestContext, goal: &Goal) -> CoreResult<Option<Project>> {
        self.optional_parent(ctx, "goal.project", goal.project_id)
    }

    pub fn goal_context(&self, ctx: &RequestContext, goal: &Goal) -> CoreResult<Option<Context>> {
        self.optional_parent(ctx, "goal.context", goal.context_id)
    }

    /// Tasks under the goal, most urgent first.
    pub fn goal_tasks(&self, ctx: &RequestContext, goal: &Goal) -> CoreResult<Vec<Task>> {
        self.children(ctx, "goal.tasks", "goal_id", goal.id, URGENCY_ORDER)
    }

    pub fn project_workspace(
        &self,
        ctx: &RequestContext,
        project: &Project,
    ) -> CoreResult<Option<Workspace>> {
        self.optional_parent(ctx, "project.workspace", project.workspace_id)
    }

    /// Goals of the project, newest first.
    pub fn project_goals(&self, ctx: &RequestContext, project: &Project) -> CoreResult<Vec<Goal>> {
        self.children(ctx, "project.goals", "project_id", project.id, NEWEST_FIRST)
    }

    /// Tasks attached directly to the project, newest first.
    pub fn project_tasks(&self, ctx: &RequestContext, project: &Project) -> CoreResult<Vec<Task>> {
        self.children(ctx, "project.tasks", "project_id", project.id, NEWEST_FIRST)
    }

    pub fn task_goal(&self, ctx: &RequestContext, task: &Task) -> CoreResult<Option<Goal>> {
        self.optional_parent(ctx, "task.goal", task.goal_id)
    }

    pub fn task_project(&self, ctx: &RequestContext, task: &Task) -> CoreResult<Option<Project>> {
        self.optional_parent(ctx, "task.project", task.project_id)
    }

    pub fn task_context(&self, ctx: &RequestContext, task: &Task) -> CoreResult<Option<Context>> {
        self.optional_parent(ctx, "task.context", task.context_id)
    }

    pub fn context_parent(
        &self,
        ctx: &RequestContext,
        context: &Context,
    ) -> CoreResult<Option<Context>> {
        self.optional_parent(ctx, "context.parent", context.parent_id)
    }

    /// Direct sub-contexts, oldest first.
    pub fn context_children(
        &self,
        ctx: &RequestContext,
        context: &Context,
    ) -> CoreResult<Vec<Context>> {
        self.children(ctx, "context.children", "parent_id", context.id, OLDEST_FIRST)
    }

    pub fn tag_parent(&self, ctx: &RequestContext, tag: &Tag) -> CoreResult<Option<Tag>> {
        self.optional_parent(ctx, "tag.parent", tag.parent_id)
    }

    /// Direct sub-tags by name.
    pub fn tag_children(&self, ctx: &RequestContext, tag: &Tag) -> CoreResult<Vec<Tag>> {
        self.children(ctx, "tag.children", "parent_id", tag.id, BY_NAME)
    }

    /// Tags of any taggable entity, by name.
    pub fn tags<E: Annotatable>(&self, ctx: &RequestContext, entity: &E) -> CoreResult<Vec<Tag>> {
        self.associations
            .list_tags_for(ctx, E::KIND, entity.entity_id())
    }

    /// Notes of any annotatable entity, newest first.
    pub fn notes<E: Annotatable>(
        &self,
        ctx: &RequestContext,
        entity: &E,
    ) -> CoreResult<Vec<Note>> {
        self.associations
            .list_notes_for(ctx, E::KIND, entity.entity_id())
    }

    fn optional_parent<R: Record>(
        &self,
        ctx: &RequestContext,
        field: &'static str,
        foreign_key: Option<EntityId>,
    ) -> CoreResult<Option<R>> {
        let Some(parent_id) = foreign_key else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1;",
            R::returning_list(),
            R::TABLE
        );
        match self
            .store
            .query_optional(ctx, &sql, &[Value::from(parent_id)])?
        {
            Some(row) => Ok(Some(R::from_row(&row)?)),
            None => {
                debug!(
                    "event=field_resolve module=resolve status=dangling field={} request_id={} parent_id={}",
                    field,
                    ctx.request_id(),
                    parent_id
                );
                Ok(None)
            }
        }
    }

    fn children<R: Record>(
        &self,
        ctx: &RequestContext,
        field: &'static str,
        foreign_key_column: &'static str,
        parent_id: EntityId,
        order_by: &'static str,
    ) -> CoreResult<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {foreign_key_column} = ?1 ORDER BY {order_by};",
            R::returning_list(),
            R::TABLE
        );
        let rows = self.store.query(ctx, &sql, &[Value::from(parent_id)])?;
        let children = rows
            .iter()
            .map(R::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "event=field_resolve module=resolve status=ok field={} request_id={} count={}",
            field,
            ctx.request_id(),
            children.len()
        );
        Ok(children)
    }
}
