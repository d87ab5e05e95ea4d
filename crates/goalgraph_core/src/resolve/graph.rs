//! Selection-driven expansion of one entity into a partial graph.
//!
//! # Invariants
//! - Only selected fields are resolved; each costs one round trip.
//! - Unselected fields stay `Expanded::NotRequested`, which is distinct from
//!   a resolved-but-empty collection or a resolved-but-absent parent.

use crate::context::RequestContext;
use crate::error::CoreResult;
use crate::model::entity::{Context, Goal, Note, Project, Tag, Task, Workspace};
use crate::resolve::fields::{ContextField, GoalField, ProjectField, TagField, TaskField};
use crate::resolve::resolver::FieldResolver;
use crate::store::RelationalStore;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Resolution state of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expanded<T> {
    NotRequested,
    Loaded(T),
}

impl<T> Expanded<T> {
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotRequested => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotRequested => None,
        }
    }

    fn is_not_requested(&self) -> bool {
        !self.is_requested()
    }
}

impl<T: Serialize> Serialize for Expanded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Loaded(value) => value.serialize(serializer),
            Self::NotRequested => serializer.serialize_none(),
        }
    }
}

fn expand_if<T>(
    selected: bool,
    resolve: impl FnOnce() -> CoreResult<T>,
) -> CoreResult<Expanded<T>> {
    if selected {
        resolve().map(Expanded::Loaded)
    } else {
        Ok(Expanded::NotRequested)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalGraph {
    #[serde(flatten)]
    pub goal: Goal,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub project: Expanded<Option<Project>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub context: Expanded<Option<Context>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub tasks: Expanded<Vec<Task>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub tags: Expanded<Vec<Tag>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub notes: Expanded<Vec<Note>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectGraph {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub workspace: Expanded<Option<Workspace>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub goals: Expanded<Vec<Goal>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub tasks: Expanded<Vec<Task>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub tags: Expanded<Vec<Tag>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub notes: Expanded<Vec<Note>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGraph {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub goal: Expanded<Option<Goal>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub project: Expanded<Option<Project>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub context: Expanded<Option<Context>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub tags: Expanded<Vec<Tag>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub notes: Expanded<Vec<Note>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextGraph {
    #[serde(flatten)]
    pub context: Context,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub parent: Expanded<Option<Context>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub children: Expanded<Vec<Context>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGraph {
    #[serde(flatten)]
    pub tag: Tag,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub parent: Expanded<Option<Tag>>,
    #[serde(skip_serializing_if = "Expanded::is_not_requested")]
    pub children: Expanded<Vec<Tag>>,
}

impl<S: RelationalStore + ?Sized> FieldResolver<'_, S> {
    pub fn expand_goal(
        &self,
        ctx: &RequestContext,
        goal: Goal,
        selection: &BTreeSet<GoalField>,
    ) -> CoreResult<GoalGraph> {
        let wants = |field| selection.contains(&field);
        Ok(GoalGraph {
            project: expand_if(wants(GoalField::Project), || self.goal_project(ctx, &goal))?,
            context: expand_if(wants(GoalField::Context), || self.goal_context(ctx, &goal))?,
            tasks: expand_if(wants(GoalField::Tasks), || self.goal_tasks(ctx, &goal))?,
            tags: expand_if(wants(GoalField::Tags), || self.tags(ctx, &goal))?,
            notes: expand_if(wants(GoalField::Notes), || self.notes(ctx, &goal))?,
            goal,
        })
    }

    pub fn expand_project(
        &self,
        ctx: &RequestContext,
        project: Project,
        selection: &BTreeSet<ProjectField>,
    ) -> CoreResult<ProjectGraph> {
        let wants = |field| selection.contains(&field);
        Ok(ProjectGraph {
            workspace: expand_if(wants(ProjectField::Workspace), || {
                self.project_workspace(ctx, &project)
            })?,
            goals: expand_if(wants(ProjectField::Goals), || {
                self.project_goals(ctx, &project)
            })?,
            tasks: expand_if(wants(ProjectField::Tasks), || {
                self.project_tasks(ctx, &project)
            })?,
            tags: expand_if(wants(ProjectField::Tags), || self.tags(ctx, &project))?,
            notes: expand_if(wants(ProjectField::Notes), || self.notes(ctx, &project))?,
            project,
        })
    }

    pub fn expand_task(
        &self,
        ctx: &RequestContext,
        task: Task,
        selection: &BTreeSet<TaskField>,
    ) -> CoreResult<TaskGraph> {
        let wants = |field| selection.contains(&field);
        Ok(TaskGraph {
            goal: expand_if(wants(TaskField::Goal), || self.task_goal(ctx, &task))?,
            project: expand_if(wants(TaskField::Project), || self.task_project(ctx, &task))?,
            context: expand_if(wants(TaskField::Context), || self.task_context(ctx, &task))?,
            tags: expand_if(wants(TaskField::Tags), || self.tags(ctx, &task))?,
            notes: expand_if(wants(TaskField::Notes), || self.notes(ctx, &task))?,
            task,
        })
    }

    pub fn expand_context(
        &self,
        ctx: &RequestContext,
        context: Context,
        selection: &BTreeSet<ContextField>,
    ) -> CoreResult<ContextGraph> {
        let wants = |field| selection.contains(&field);
        Ok(ContextGraph {
            parent: expand_if(wants(ContextField::Parent), || {
                self.context_parent(ctx, &context)
            })?,
            children: expand_if(wants(ContextField::Children), || {
                self.context_children(ctx, &context)
            })?,
            context,
        })
    }

    pub fn expand_tag(
        &self,
        ctx: &RequestContext,
        tag: Tag,
        selection: &BTreeSet<TagField>,
    ) -> CoreResult<TagGraph> {
        let wants = |field| selection.contains(&field);
        Ok(TagGraph {
            parent: expand_if(wants(TagField::Parent), || self.tag_parent(ctx, &tag))?,
            children: expand_if(wants(TagField::Children), || self.tag_children(ctx, &tag))?,
            tag,
        })
    }
}
