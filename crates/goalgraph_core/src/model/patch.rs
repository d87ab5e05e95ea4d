//! Sparse update payloads.
//!
//! # Responsibility
//! - Encode "absent / present-null / present-value" for each updatable field.
//! - Expose each patch as a list of whitelisted column assignments.
//!
//! # Invariants
//! - A missing JSON key decodes to `Absent`; an explicit `null` to `Null`.
//! - Non-nullable columns are `Option<T>`: present or absent, never null.
//! - Column identifiers only come from the per-entity column enums below.

use crate::model::entity::{Context, Goal, Note, Project, Record, Tag, Task};
use crate::model::kind::EntityId;
use rusqlite::types::Value;
use serde::{Deserialize, Deserializer};

/// Tri-state value for a nullable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Field not supplied; the column is left untouched.
    Absent,
    /// Field supplied as null; the column is cleared.
    Null,
    /// Field supplied with a value.
    Value(T),
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> FieldPatch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Bindable value, or `None` when the field is absent.
    pub fn to_value(&self) -> Option<Value>
    where
        T: Clone + Into<Value>,
    {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::Value(value) => Some(value.clone().into()),
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

// Only reached when the key is present; `#[serde(default)]` covers absence.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Whitelisted updatable column of one entity.
pub trait PatchColumn: Copy + Ord {
    fn as_str(self) -> &'static str;
}

/// Sparse update for one entity table.
pub trait SparsePatch {
    type Column: PatchColumn;
    type Output: Record;

    /// Whether the target table carries an `updated_at` column to touch.
    const TOUCHES_UPDATED_AT: bool;

    /// Present fields only, each paired with its bound value.
    fn assignments(&self) -> Vec<(Self::Column, Value)>;
}

fn present<T: Clone + Into<Value>>(value: &Option<T>) -> Option<Value> {
    value.clone().map(Into::into)
}

fn collect<C>(fields: impl IntoIterator<Item = (C, Option<Value>)>) -> Vec<(C, Value)> {
    fields
        .into_iter()
        .filter_map(|(column, value)| value.map(|value| (column, value)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectColumn {
    Title,
    Description,
    Status,
    WorkspaceId,
}

impl PatchColumn for ProjectColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::WorkspaceId => "workspace_id",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub workspace_id: FieldPatch<EntityId>,
}

impl SparsePatch for ProjectPatch {
    type Column = ProjectColumn;
    type Output = Project;
    const TOUCHES_UPDATED_AT: bool = true;

    fn assignments(&self) -> Vec<(ProjectColumn, Value)> {
        collect([
            (ProjectColumn::Title, present(&self.title)),
            (ProjectColumn::Description, present(&self.description)),
            (ProjectColumn::Status, present(&self.status)),
            (ProjectColumn::WorkspaceId, self.workspace_id.to_value()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GoalColumn {
    Title,
    Description,
    Priority,
    Status,
    DueDate,
    ProjectId,
    ContextId,
}

impl PatchColumn for GoalColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::DueDate => "due_date",
            Self::ProjectId => "project_id",
            Self::ContextId => "context_id",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub status: Option<String>,
    pub due_date: FieldPatch<i64>,
    pub project_id: FieldPatch<EntityId>,
    /// Accepts `flow_id` from clients that still use the Flow name.
    #[serde(alias = "flow_id")]
    pub context_id: FieldPatch<EntityId>,
}

impl SparsePatch for GoalPatch {
    type Column = GoalColumn;
    type Output = Goal;
    const TOUCHES_UPDATED_AT: bool = true;

    fn assignments(&self) -> Vec<(GoalColumn, Value)> {
        collect([
            (GoalColumn::Title, present(&self.title)),
            (GoalColumn::Description, present(&self.description)),
            (GoalColumn::Priority, present(&self.priority)),
            (GoalColumn::Status, present(&self.status)),
            (GoalColumn::DueDate, self.due_date.to_value()),
            (GoalColumn::ProjectId, self.project_id.to_value()),
            (GoalColumn::ContextId, self.context_id.to_value()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskColumn {
    Title,
    Description,
    Priority,
    Status,
    DueDate,
    GoalId,
    ProjectId,
    ContextId,
}

impl PatchColumn for TaskColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::DueDate => "due_date",
            Self::GoalId => "goal_id",
            Self::ProjectId => "project_id",
            Self::ContextId => "context_id",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub status: Option<String>,
    pub due_date: FieldPatch<i64>,
    pub goal_id: FieldPatch<EntityId>,
    pub project_id: FieldPatch<EntityId>,
    #[serde(alias = "flow_id")]
    pub context_id: FieldPatch<EntityId>,
}

impl SparsePatch for TaskPatch {
    type Column = TaskColumn;
    type Output = Task;
    const TOUCHES_UPDATED_AT: bool = true;

    fn assignments(&self) -> Vec<(TaskColumn, Value)> {
        collect([
            (TaskColumn::Title, present(&self.title)),
            (TaskColumn::Description, present(&self.description)),
            (TaskColumn::Priority, present(&self.priority)),
            (TaskColumn::Status, present(&self.status)),
            (TaskColumn::DueDate, self.due_date.to_value()),
            (TaskColumn::GoalId, self.goal_id.to_value()),
            (TaskColumn::ProjectId, self.project_id.to_value()),
            (TaskColumn::ContextId, self.context_id.to_value()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextColumn {
    Title,
    Description,
    Color,
    Status,
    StartDate,
    EndDate,
    ParentId,
}

impl PatchColumn for ContextColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Color => "color",
            Self::Status => "status",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::ParentId => "parent_id",
        }
    }
}

/// `workspace_id` is fixed at creation and not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub start_date: FieldPatch<i64>,
    pub end_date: FieldPatch<i64>,
    pub parent_id: FieldPatch<EntityId>,
}

impl SparsePatch for ContextPatch {
    type Column = ContextColumn;
    type Output = Context;
    const TOUCHES_UPDATED_AT: bool = true;

    fn assignments(&self) -> Vec<(ContextColumn, Value)> {
        collect([
            (ContextColumn::Title, present(&self.title)),
            (ContextColumn::Description, present(&self.description)),
            (ContextColumn::Color, present(&self.color)),
            (ContextColumn::Status, present(&self.status)),
            (ContextColumn::StartDate, self.start_date.to_value()),
            (ContextColumn::EndDate, self.end_date.to_value()),
            (ContextColumn::ParentId, self.parent_id.to_value()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagColumn {
    Name,
    Color,
    ParentId,
}

impl PatchColumn for TagColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Color => "color",
            Self::ParentId => "parent_id",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub parent_id: FieldPatch<EntityId>,
}

impl SparsePatch for TagPatch {
    type Column = TagColumn;
    type Output = Tag;
    const TOUCHES_UPDATED_AT: bool = false;

    fn assignments(&self) -> Vec<(TagColumn, Value)> {
        collect([
            (TagColumn::Name, present(&self.name)),
            (TagColumn::Color, present(&self.color)),
            (TagColumn::ParentId, self.parent_id.to_value()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoteColumn {
    Title,
    Content,
}

impl PatchColumn for NoteColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

/// The attachment pair of a note is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl SparsePatch for NotePatch {
    type Column = NoteColumn;
    type Output = Note;
    const TOUCHES_UPDATED_AT: bool = true;

    fn assignments(&self) -> Vec<(NoteColumn, Value)> {
        collect([
            (NoteColumn::Title, present(&self.title)),
            (NoteColumn::Content, present(&self.content)),
        ])
    }
}
