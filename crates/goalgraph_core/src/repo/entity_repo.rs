//! Single-table write surface for populating the graph.
//!
//! # Responsibility
//! - Insert entities and return the stored rows with generated columns.
//! - Read one row by id and hard-delete one row by id.
//!
//! # Invariants
//! - Inserts are single `INSERT ... RETURNING` round trips.
//! - Missing rows surface as `CoreError::NotFound`, never as `None`.

use crate::context::RequestContext;
use crate::error::{CoreError, CoreResult};
use crate::model::entity::{Context, Goal, Project, Record, Tag, Task, Workspace};
use crate::model::kind::EntityId;
use crate::store::RelationalStore;
use log::{info, warn};
use rusqlite::types::Value;
use serde::Deserialize;

/// Insert payload for one entity table.
pub trait NewRecord {
    type Output: Record;

    /// Supplied columns; omitted ones take the schema default.
    fn values(&self) -> Vec<(&'static str, Value)>;
}

fn optional<T: Clone + Into<Value>>(
    values: &mut Vec<(&'static str, Value)>,
    column: &'static str,
    value: &Option<T>,
) {
    if let Some(value) = value {
        values.push((column, value.clone().into()));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewWorkspace {
    pub name: String,
    pub description: String,
}

impl NewRecord for NewWorkspace {
    type Output = Workspace;

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::Text(self.name.clone())),
            ("description", Value::Text(self.description.clone())),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewContext {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    pub workspace_id: EntityId,
}

impl NewContext {
    pub fn new(title: impl Into<String>, workspace_id: EntityId) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            color: String::new(),
            status: None,
            start_date: None,
            end_date: None,
            parent_id: None,
            workspace_id,
        }
    }
}

impl NewRecord for NewContext {
    type Output = Context;

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("title", Value::Text(self.title.clone())),
            ("description", Value::Text(self.description.clone())),
            ("color", Value::Text(self.color.clone())),
            ("workspace_id", Value::from(self.workspace_id)),
        ];
        optional(&mut values, "status", &self.status);
        optional(&mut values, "start_date", &self.start_date);
        optional(&mut values, "end_date", &self.end_date);
        optional(&mut values, "parent_id", &self.parent_id);
        values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
    pub workspace_id: Option<EntityId>,
}

impl NewProject {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl NewRecord for NewProject {
    type Output = Project;

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("title", Value::Text(self.title.clone())),
            ("description", Value::Text(self.description.clone())),
        ];
        optional(&mut values, "status", &self.status);
        optional(&mut values, "workspace_id", &self.workspace_id);
        values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: Option<String>,
    pub due_date: Option<i64>,
    pub project_id: Option<EntityId>,
    #[serde(alias = "flow_id")]
    pub context_id: Option<EntityId>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl NewRecord for NewGoal {
    type Output = Goal;

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("title", Value::Text(self.title.clone())),
            ("description", Value::Text(self.description.clone())),
            ("priority", Value::Integer(self.priority)),
        ];
        optional(&mut values, "status", &self.status);
        optional(&mut values, "due_date", &self.due_date);
        optional(&mut values, "project_id", &self.project_id);
        optional(&mut values, "context_id", &self.context_id);
        values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: Option<String>,
    pub due_date: Option<i64>,
    pub goal_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
    #[serde(alias = "flow_id")]
    pub context_id: Option<EntityId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl NewRecord for NewTask {
    type Output = Task;

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("title", Value::Text(self.title.clone())),
            ("description", Value::Text(self.description.clone())),
            ("priority", Value::Integer(self.priority)),
        ];
        optional(&mut values, "status", &self.status);
        optional(&mut values, "due_date", &self.due_date);
        optional(&mut values, "goal_id", &self.goal_id);
        optional(&mut values, "project_id", &self.project_id);
        optional(&mut values, "context_id", &self.context_id);
        values
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub parent_id: Option<EntityId>,
}

impl NewTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl NewRecord for NewTag {
    type Output = Tag;

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("name", Value::Text(self.name.clone())),
            ("color", Value::Text(self.color.clone())),
        ];
        optional(&mut values, "parent_id", &self.parent_id);
        values
    }
}

/// Entity writes and point reads bound to one store.
pub struct EntityRepository<'s, S: RelationalStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RelationalStore + ?Sized> EntityRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Inserts one row and returns it with generated id and timestamps.
    pub fn create<N: NewRecord>(&self, ctx: &RequestContext, input: &N) -> CoreResult<N::Output> {
        let values = input.values();
        let columns = values
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=values.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let params = values
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders}) RETURNING {};",
            N::Output::TABLE,
            N::Output::returning_list()
        );

        let result = self
            .store
            .insert_returning(ctx, &sql, &params)
            .map_err(CoreError::from)
            .and_then(|row| Ok(N::Output::from_row(&row)?));
        match &result {
            Ok(_) => info!(
                "event=entity_create module=repo status=ok entity={} request_id={}",
                N::Output::ENTITY,
                ctx.request_id()
            ),
            Err(err) => warn!(
                "event=entity_create module=repo status=error entity={} request_id={} error_code={}",
                N::Output::ENTITY,
                ctx.request_id(),
                err.code()
            ),
        }
        result
    }

    pub fn create_workspace(
        &self,
        ctx: &RequestContext,
        input: &NewWorkspace,
    ) -> CoreResult<Workspace> {
        self.create(ctx, input)
    }

    pub fn create_context(&self, ctx: &RequestContext, input: &NewContext) -> CoreResult<Context> {
        self.create(ctx, input)
    }

    pub fn create_project(&self, ctx: &RequestContext, input: &NewProject) -> CoreResult<Project> {
        self.create(ctx, input)
    }

    pub fn create_goal(&self, ctx: &RequestContext, input: &NewGoal) -> CoreResult<Goal> {
        self.create(ctx, input)
    }

    pub fn create_task(&self, ctx: &RequestContext, input: &NewTask) -> CoreResult<Task> {
        self.create(ctx, input)
    }

    pub fn create_tag(&self, ctx: &RequestContext, input: &NewTag) -> CoreResult<Tag> {
        self.create(ctx, input)
    }

    /// Reads one row by id.
    pub fn get<R: Record>(&self, ctx: &RequestContext, id: EntityId) -> CoreResult<R> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1;",
            R::returning_list(),
            R::TABLE
        );
        let row = self
            .store
            .query_optional(ctx, &sql, &[Value::from(id)])?
            .ok_or_else(|| CoreError::not_found(R::ENTITY, id))?;
        Ok(R::from_row(&row)?)
    }

    /// Hard-deletes one row by id.
    ///
    /// Tagging rows go with it through the schema's cascades; notes stay.
    pub fn delete<R: Record>(&self, ctx: &RequestContext, id: EntityId) -> CoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", R::TABLE);
        let changed = self.store.exec(ctx, &sql, &[Value::from(id)])?;
        if changed == 0 {
            return Err(CoreError::not_found(R::ENTITY, id));
        }
        info!(
            "event=entity_delete module=repo status=ok entity={} id={} request_id={}",
            R::ENTITY,
            id,
            ctx.request_id()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NewContext, NewGoal, NewRecord};
    use crate::model::kind::EntityId;
    use rusqlite::types::Value;

    #[test]
    fn omitted_optional_columns_fall_back_to_schema_defaults() {
        let columns = NewGoal::new("ship")
            .values()
            .into_iter()
            .map(|(column, _)| column)
            .collect::<Vec<_>>();
        assert_eq!(columns, vec!["title", "description", "priority"]);
    }

    #[test]
    fn context_always_binds_its_workspace() {
        let values = NewContext::new("q3", EntityId::new(2).unwrap()).values();
        assert!(values.contains(&("workspace_id", Value::Integer(2))));
    }
}
