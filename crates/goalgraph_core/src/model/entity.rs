//! Persisted entity snapshots.
//!
//! # Responsibility
//! - Define the in-process shape of every table row.
//! - Bind each shape to its table and column list through `Record`.
//!
//! # Invariants
//! - Values are transient snapshots; the store owns persisted state.
//! - `Record::COLUMNS` lists every column `from_row` decodes, in table order.
//! - Timestamps and dates are Unix epoch milliseconds.

use crate::model::kind::{EntityId, EntityKind};
use crate::store::{StoreResult, StoreRow};
use serde::{Deserialize, Serialize};

/// Table-backed row type.
pub trait Record: Sized {
    /// Physical table name.
    const TABLE: &'static str;
    /// Singular name used in errors and log lines.
    const ENTITY: &'static str;
    /// Every decoded column, `id` first.
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &StoreRow) -> StoreResult<Self>;

    /// `alias.col AS col, ...` for joined selects.
    fn select_list(alias: &str) -> String {
        Self::COLUMNS
            .iter()
            .map(|column| format!("{alias}.{column} AS {column}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Bare column list for `RETURNING` clauses.
    fn returning_list() -> String {
        Self::COLUMNS.join(", ")
    }
}

/// Entity kinds that accept tags and notes.
pub trait Annotatable {
    const KIND: EntityKind;

    fn entity_id(&self) -> EntityId;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub created_at: i64,
}

impl Record for Workspace {
    const TABLE: &'static str = "workspaces";
    const ENTITY: &'static str = "workspace";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description", "created_at"];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Context (a.k.a. Flow): a self-nesting grouping inside one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub color: String,
    pub status: String,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub parent_id: Option<EntityId>,
    pub workspace_id: EntityId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Context {
    const TABLE: &'static str = "contexts";
    const ENTITY: &'static str = "context";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "color",
        "status",
        "start_date",
        "end_date",
        "parent_id",
        "workspace_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            color: row.get("color")?,
            status: row.get("status")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            parent_id: row.get("parent_id")?,
            workspace_id: row.get("workspace_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub workspace_id: Option<EntityId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Annotatable for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Record for Project {
    const TABLE: &'static str = "projects";
    const ENTITY: &'static str = "project";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "status",
        "workspace_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: row.get("status")?,
            workspace_id: row.get("workspace_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Goal; `priority` grows with urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: String,
    pub due_date: Option<i64>,
    pub project_id: Option<EntityId>,
    pub context_id: Option<EntityId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Annotatable for Goal {
    const KIND: EntityKind = EntityKind::Goal;

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Record for Goal {
    const TABLE: &'static str = "goals";
    const ENTITY: &'static str = "goal";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "priority",
        "status",
        "due_date",
        "project_id",
        "context_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            priority: row.get("priority")?,
            status: row.get("status")?,
            due_date: row.get("due_date")?,
            project_id: row.get("project_id")?,
            context_id: row.get("context_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Task; may hang off a goal, directly off a project, or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: String,
    pub due_date: Option<i64>,
    pub goal_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
    pub context_id: Option<EntityId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Annotatable for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Record for Task {
    const TABLE: &'static str = "tasks";
    const ENTITY: &'static str = "task";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "priority",
        "status",
        "due_date",
        "goal_id",
        "project_id",
        "context_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            priority: row.get("priority")?,
            status: row.get("status")?,
            due_date: row.get("due_date")?,
            goal_id: row.get("goal_id")?,
            project_id: row.get("project_id")?,
            context_id: row.get("context_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: EntityId,
    pub name: String,
    pub color: String,
    pub parent_id: Option<EntityId>,
    pub created_at: i64,
}

impl Record for Tag {
    const TABLE: &'static str = "tags";
    const ENTITY: &'static str = "tag";
    const COLUMNS: &'static [&'static str] = &["id", "name", "color", "parent_id", "created_at"];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            parent_id: row.get("parent_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Free-text note attached to one `(entity_type, entity_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    pub entity_type: EntityKind,
    pub entity_id: EntityId,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Note {
    const TABLE: &'static str = "notes";
    const ENTITY: &'static str = "note";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "content",
        "entity_type",
        "entity_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &StoreRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            entity_type: row.get("entity_type")?,
            entity_id: row.get("entity_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, Record, Tag};
    use crate::model::kind::EntityKind;
    use crate::store::{StoreError, StoreRow};
    use rusqlite::types::Value;
    use std::sync::Arc;

    #[test]
    fn select_list_aliases_every_column() {
        assert_eq!(
            Tag::select_list("t"),
            "t.id AS id, t.name AS name, t.color AS color, t.parent_id AS parent_id, t.created_at AS created_at"
        );
        assert_eq!(Tag::returning_list(), "id, name, color, parent_id, created_at");
    }

    #[test]
    fn note_row_decodes_entity_kind_and_rejects_unknown_literal() {
        let columns: Arc<[String]> = Note::COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut values = vec![
            Value::Integer(1),
            Value::Text("t".to_string()),
            Value::Text("c".to_string()),
            Value::Text("goal".to_string()),
            Value::Integer(5),
            Value::Integer(10),
            Value::Integer(11),
        ];
        let note = Note::from_row(&StoreRow::new(Arc::clone(&columns), values.clone())).unwrap();
        assert_eq!(note.entity_type, EntityKind::Goal);
        assert_eq!(note.entity_id.get(), 5);

        values[3] = Value::Text("widget".to_string());
        assert!(matches!(
            Note::from_row(&StoreRow::new(columns, values)),
            Err(StoreError::InvalidData(_))
        ));
    }
}
